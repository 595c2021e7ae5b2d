//! Export scenario bundles to CSV (`period,base,positive,negative`).

use std::fmt::Display;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::domain::ScenarioBundle;
use crate::error::AppError;

pub fn write_scenarios_csv<I: Display>(path: &Path, bundle: &ScenarioBundle<I>) -> Result<(), AppError> {
    let file = std::fs::File::create(path)
        .map_err(|e| AppError::config(path.display().to_string(), format!("failed to create export CSV: {e}")))?;
    write_scenarios(file, bundle)
        .map_err(|e| AppError::config(path.display().to_string(), format!("failed to write export CSV: {e}")))?;
    info!(path = %path.display(), rows = bundle.index.len(), "scenarios exported");
    Ok(())
}

pub fn write_scenarios<W: Write, I: Display>(out: W, bundle: &ScenarioBundle<I>) -> Result<(), csv::Error> {
    let mut w = csv::Writer::from_writer(out);
    w.write_record(["period", "base", "positive", "negative"])?;
    let s = &bundle.scenarios;
    for (i, period) in bundle.index.iter().enumerate() {
        w.write_record([
            period.to_string(),
            s.base[i].to_string(),
            s.positive[i].to_string(),
            s.negative[i].to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScenarioSet;
    use crate::scenario::bundle;

    #[test]
    fn header_and_rows() {
        let b = bundle(
            vec![2030, 2031],
            ScenarioSet {
                base: vec![3.0, 3.25],
                positive: vec![2.5, 2.75],
                negative: vec![4.0, 4.5],
            },
        );
        let mut buf = Vec::new();
        write_scenarios(&mut buf, &b).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "period,base,positive,negative\n2030,3,2.5,4\n2031,3.25,2.75,4.5\n");
    }
}
