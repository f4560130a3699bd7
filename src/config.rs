use std::io;
use std::fs::File;
use std::path::Path;
use std::collections::BTreeMap;

use serde::{Serialize,Deserialize};

use super::error::{Result,Error};


/// Moves part of a spike back into the preceding low day.
#[derive(Serialize,Deserialize,Clone,Copy,Debug,PartialEq)]
#[serde(default)]
pub struct SmoothingPolicy {
    pub threshold: f64,
    pub amount: f64,
}

impl Default for SmoothingPolicy {
    fn default() -> Self {
	Self { threshold: 10.0, amount: 0.5 }
    }
}


/// Tuning of the scalar recursive filter.
///
/// `a` scales the previous estimate in the predict step, `r` is the
/// measurement noise and `q` the process noise.
#[derive(Serialize,Deserialize,Clone,Copy,Debug,PartialEq)]
#[serde(default)]
pub struct KalmanParams {
    pub a: f64,
    pub r: f64,
    pub q: f64,
}

impl Default for KalmanParams {
    fn default() -> Self {
	Self { a: 1.2, r: 0.1, q: 0.5 }
    }
}

impl KalmanParams {

    pub fn validate(&self) -> Result<()> {
	if !self.a.is_finite() {
	    return Err(Error::InvalidParameter(format!("filter gain must be finite, got {}", self.a)));
	}
	if !self.r.is_finite() || self.r <= 0.0 {
	    return Err(Error::InvalidParameter(format!(
		"measurement noise must be positive, got {}", self.r)));
	}
	if !self.q.is_finite() || self.q < 0.0 {
	    return Err(Error::InvalidParameter(format!(
		"process noise must not be negative, got {}", self.q)));
	}
	Ok(())
    }

}


#[derive(Serialize,Deserialize,Clone,Copy,Debug,PartialEq)]
#[serde(default)]
pub struct InfectionParams {
    /// Assumed fatality rate, in percent (1.0 means 1%).
    pub death_rate_percent: f64,
    /// Days between infection and death.
    pub lag_days: usize,
    /// Number of filtered days the extrapolation trend is taken over.
    pub trend_days: usize,
}

impl Default for InfectionParams {
    fn default() -> Self {
	Self { death_rate_percent: 1.0, lag_days: 14, trend_days: 5 }
    }
}

impl InfectionParams {

    pub fn validate(&self) -> Result<()> {
	if !self.death_rate_percent.is_finite() || self.death_rate_percent <= 0.0 {
	    return Err(Error::InvalidParameter(format!(
		"death rate must be a positive percentage, got {}",
		self.death_rate_percent)));
	}
	if self.trend_days == 0 {
	    return Err(Error::InvalidParameter(
		"trend window must span at least one day".to_string()));
	}
	Ok(())
    }

}


/// What to put in dates a country did not report after its first report.
#[derive(Serialize,Deserialize,Clone,Copy,Debug,PartialEq,Eq)]
#[serde(rename_all = "kebab-case")]
pub enum GapPolicy {
    LeaveZero,
    CarryForward,
}

impl Default for GapPolicy {
    fn default() -> Self {
	Self::LeaveZero
    }
}


#[derive(Serialize,Deserialize,Clone,Debug,PartialEq)]
#[serde(default)]
pub struct Config {
    pub smoothing: SmoothingPolicy,
    pub kalman: KalmanParams,
    pub infection: InfectionParams,
    pub gap_policy: GapPolicy,
    pub top_n: usize,
    pub labels: BTreeMap<String,String>,
}

impl Default for Config {
    fn default() -> Self {
	Self {
	    smoothing: SmoothingPolicy::default(),
	    kalman: KalmanParams::default(),
	    infection: InfectionParams::default(),
	    gap_policy: GapPolicy::default(),
	    top_n: 7,
	    labels: BTreeMap::new(),
	}
    }
}

impl Config {

    pub fn from_path(path: &Path) -> Result<Self> {
	Ok(serde_json::from_reader(io::BufReader::new(File::open(path)?))?)
    }

    /// Display label for a country code, falling back to the code itself.
    pub fn label<'a>(&'a self, code: &'a str) -> &'a str {
	self.labels.get(code).map_or(code, |l| l.as_str())
    }

}
