//! Raw series → one monthly table.
//!
//! Steps, in order:
//! 1. outer-join every raw series on date
//! 2. forward-fill each column over the joined dates
//! 3. average within each calendar month (month-start index); months with no
//!    observation in a column stay missing
//! 4. drop the final month when it is the still-accruing `as_of` month

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::data::RawSeries;
use crate::domain::Frame;
use crate::error::AppError;

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after `date`'s month.
pub fn next_month(date: NaiveDate) -> NaiveDate {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(date)
}

/// Month-start dates `[from, to]`, both inclusive.
pub fn month_range(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut d = month_start(from);
    let end = month_start(to);
    while d <= end {
        out.push(d);
        d = next_month(d);
    }
    out
}

pub fn align_monthly(raw: &[RawSeries], as_of: NaiveDate) -> Result<Frame, AppError> {
    if raw.is_empty() {
        return Err(AppError::config("series", "no raw series to align"));
    }

    // 1. outer join
    let mut joined: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for (c, series) in raw.iter().enumerate() {
        for &(date, value) in &series.observations {
            joined.entry(date).or_insert_with(|| vec![f64::NAN; raw.len()])[c] = value;
        }
    }
    let (first, last) = match (joined.keys().next(), joined.keys().next_back()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return Err(AppError::config("series", "raw series contain no observations")),
    };

    // 2. forward fill
    let mut carry = vec![f64::NAN; raw.len()];
    for row in joined.values_mut() {
        for (c, v) in row.iter_mut().enumerate() {
            if v.is_finite() {
                carry[c] = *v;
            } else {
                *v = carry[c];
            }
        }
    }

    // 3. monthly mean
    let months = month_range(first, last);
    let mut sums = vec![vec![0.0; months.len()]; raw.len()];
    let mut counts = vec![vec![0usize; months.len()]; raw.len()];
    let month_pos = |d: NaiveDate| -> usize {
        ((d.year() - first.year()) * 12 + d.month() as i32 - first.month() as i32) as usize
    };
    for (&date, row) in &joined {
        let m = month_pos(date);
        for (c, &v) in row.iter().enumerate() {
            if v.is_finite() {
                sums[c][m] += v;
                counts[c][m] += 1;
            }
        }
    }

    let mut frame = Frame::new(months);
    for (c, series) in raw.iter().enumerate() {
        let values = sums[c]
            .iter()
            .zip(&counts[c])
            .map(|(&s, &n)| if n > 0 { s / n as f64 } else { f64::NAN })
            .collect();
        frame.push_column(series.name.clone(), values)?;
    }

    // 4. incomplete current month
    if frame.last_date() == Some(month_start(as_of)) {
        debug!(month = %month_start(as_of), "dropping incomplete current month");
        frame.drop_last_row();
    }

    Ok(frame)
}
