use tracing::debug;

use super::config::{InfectionParams,KalmanParams};
use super::error::Result;
use super::kalman::KalmanFilter;


/// Shifts daily deaths back by `lag_days` and divides by the fatality
/// rate. The last `lag_days` entries stay zero.
pub fn raw_infections(death_diff: &[f64], params: &InfectionParams) -> Result<Vec<f64>> {
    params.validate()?;
    let n = death_diff.len();
    let lag = params.lag_days;
    Ok((0..n).map(
	|i| match lag < n - i {
	    true => death_diff[i + lag] * 100.0 / params.death_rate_percent,
	    false => 0.0
	}
    ).collect())
}


/// Index range `[start, end)` spanning the first to the last strictly
/// positive value.
pub fn valid_window(raw: &[f64]) -> Option<(usize,usize)> {
    let start = raw.iter().position(|v| *v > 0.0)?;
    let end = raw.iter().rposition(|v| *v > 0.0)? + 1;
    Some((start, end))
}


/// Average daily change over the last `days` values of `filtered[start..end]`.
/// Zero when the window is not longer than `days`.
pub fn trend(filtered: &[f64], start: usize, end: usize, days: usize) -> f64 {
    match days > 0 && end - start > days {
	true => (filtered[end-1] - filtered[end-1-days]) / days as f64,
	false => {
	    debug!("only {} filtered days, extrapolating flat", end - start);
	    0.0
	}
    }
}


/// Filters the raw estimate inside its valid window and extrapolates the
/// last trend up to the end of the series.
pub fn filter_and_extrapolate(raw: &[f64], kalman: &KalmanParams,
			      trend_days: usize) -> Vec<f64> {

    let mut result = vec![0.0; raw.len()];
    let (start, end) = match valid_window(raw) {
	Some(window) => window,
	None => {
	    debug!("no positive estimate, nothing to filter");
	    return result;
	}
    };

    let offset = raw[start];
    let mut kf = KalmanFilter::new(*kalman);

    for i in start..end {
	result[i] = kf.filter(raw[i] - offset) + offset;
    }

    let last = result[end-1];
    let derivative = trend(&result, start, end, trend_days);

    for i in end..raw.len() {
	let synthetic = last + derivative * (i - end + 1) as f64;
	result[i] = kf.filter(synthetic - offset) + offset;
    }

    result.into_iter().map(|v| v.max(0.0).round()).collect()

}


pub fn infection_estimate(death_diff: &[f64], params: &InfectionParams,
			  kalman: &KalmanParams) -> Result<Vec<f64>> {
    kalman.validate()?;
    let raw = raw_infections(death_diff, params)?;
    Ok(filter_and_extrapolate(&raw, kalman, params.trend_days))
}
