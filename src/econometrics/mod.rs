//! Unit-root and cointegration testing, VAR/VECM estimation and forecasting.

pub mod analyzer;
pub mod forecast;
pub mod johansen;
pub mod model;
pub mod selection;
pub mod stationarity;
pub mod var;
pub mod vecm;

pub use analyzer::{Analysis, StationarityCointegrationAnalyzer};
pub use forecast::{ForecastPaths, INTERVAL_ALPHA, VarRepresentation};
pub use johansen::{CointegrationRankTest, JohansenResult, JohansenTrace};
pub use model::FittedModel;
pub use selection::{Estimation, ModelSelector};
pub use stationarity::{Adf, AdfResult, UnitRootTest, adfuller};
