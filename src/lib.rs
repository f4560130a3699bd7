//! Daily death series per country, smoothed, and turned into an estimate
//! of new infections from the deaths reported some days later.

pub mod error;
pub mod config;
pub mod observation;
pub mod normalize;
pub mod series;
pub mod kalman;
pub mod estimate;
pub mod aggregate;

use chrono::naive::NaiveDate;
use serde::Serialize;
use tracing::info;

pub use aggregate::{ChartSeries,Point,TopN};
pub use config::{Config,GapPolicy,InfectionParams,KalmanParams,SmoothingPolicy};
pub use error::{Error,Result};
pub use normalize::{CountrySeries,Metric};
pub use observation::{Observation,Record};


/// Cumulative, daily and smoothed daily series of one metric.
#[derive(Serialize,Clone,Debug,Default,PartialEq)]
pub struct MetricSeries {
    pub cumulative: CountrySeries,
    pub diff: CountrySeries,
    pub smoothed: CountrySeries,
}

impl MetricSeries {

    fn new(cumulative: CountrySeries, smoothing: &SmoothingPolicy) -> Self {
	let diff: CountrySeries = cumulative.iter().map(
	    |(country,series)| (country.clone(), series::daily(series))
	).collect();
	let smoothed = diff.iter().map(
	    |(country,series)| (country.clone(), series::smooth(series, smoothing))
	).collect();
	Self { cumulative, diff, smoothed }
    }

}


/// Everything derived from one complete refresh of the source data.
#[derive(Serialize,Clone,Debug,Default,PartialEq)]
pub struct Dataset {
    pub dates: Vec<NaiveDate>,
    pub deaths: MetricSeries,
    pub cases: MetricSeries,
    pub global_diff: Vec<f64>,
}

impl Dataset {

    pub fn from_observations(observations: &[Observation], config: &Config) -> Result<Self> {

	let normalized = normalize::normalize(observations, config.gap_policy)?;
	let deaths = MetricSeries::new(normalized.deaths, &config.smoothing);
	let cases = MetricSeries::new(normalized.cases, &config.smoothing);
	let global_diff = aggregate::global_total(&deaths.diff, normalized.dates.len());

	info!("normalized {} countries over {} dates",
	      deaths.cumulative.len(), normalized.dates.len());

	Ok(Self { dates: normalized.dates, deaths, cases, global_diff })

    }

    pub fn metric(&self, metric: Metric) -> &MetricSeries {
	match metric {
	    Metric::Deaths => &self.deaths,
	    Metric::Cases => &self.cases,
	}
    }

    /// Country codes with their display labels, in code order.
    pub fn countries<'a>(&'a self, config: &'a Config) -> impl Iterator<Item = (&'a str,&'a str)> {
	self.deaths.cumulative.keys().map(move |c| (c.as_str(), config.label(c)))
    }

    fn smoothed_deaths(&self, country: &str) -> Result<&Vec<f64>> {
	self.deaths.smoothed.get(country)
	    .ok_or_else(|| Error::MissingRegion(country.to_string()))
    }

    /// Filtered and extrapolated infection estimate for one country.
    /// Recomputed on every call.
    pub fn infection_estimate(&self, country: &str, params: &InfectionParams,
			      kalman: &KalmanParams) -> Result<Vec<f64>> {
	estimate::infection_estimate(self.smoothed_deaths(country)?, params, kalman)
    }

    pub fn top_countries(&self, n: usize) -> TopN {
	aggregate::top_n(&self.deaths.cumulative, &self.deaths.diff, &self.global_diff, n)
    }

    /// Shared trim start for comparing the daily deaths of `countries`.
    pub fn common_window(&self, countries: &[&str]) -> Result<usize> {
	let series = countries.iter().map(
	    |c| self.deaths.diff.get(*c).map(|s| s.as_slice())
		.ok_or_else(|| Error::MissingRegion(c.to_string()))
	).collect::<Result<Vec<_>>>()?;
	Ok(aggregate::common_window_start(&series))
    }

    pub fn chart(&self, label: &str, values: &[f64]) -> ChartSeries {
	ChartSeries::new(label, &self.dates, values)
    }

    /// Global total, then the top `n` countries and the remainder.
    pub fn top_charts(&self, n: usize, config: &Config) -> Vec<ChartSeries> {
	let top = self.top_countries(n);
	vec![self.chart("Global", &self.global_diff)].into_iter()
	    .chain(top.ranked.iter().map(|(c,s)| self.chart(config.label(c), s)))
	    .chain(vec![self.chart("Other", &top.other)])
	    .collect()
    }

}


#[cfg(test)]
mod tests {
    use super::*;

    fn obs(country: &str, day: u32, deaths: f64) -> Observation {
	Observation {
	    country: country.to_string(),
	    date: NaiveDate::from_ymd_opt(2020, 3, day).unwrap(),
	    deaths,
	    cases: deaths * 20.0,
	}
    }

    fn dataset() -> Dataset {
	let data = vec![
	    obs("NL", 1, 0.0), obs("NL", 2, 5.0), obs("NL", 3, 5.0), obs("NL", 4, 12.0),
	    obs("BE", 2, 1.0), obs("BE", 3, 4.0), obs("BE", 4, 30.0),
	    obs("LU", 4, 1.0),
	];
	Dataset::from_observations(&data, &Config::default()).unwrap()
    }

    #[test]
    fn derives_all_series() {
	let ds = dataset();
	assert_eq!(ds.dates.len(), 4);
	assert_eq!(ds.deaths.diff["NL"], vec![0.0, 5.0, 0.0, 7.0]);
	assert_eq!(ds.deaths.diff["BE"], vec![0.0, 1.0, 3.0, 26.0]);
	assert_eq!(ds.deaths.smoothed["BE"], vec![0.0, 1.0, 16.0, 13.0]);
	assert_eq!(ds.metric(Metric::Cases).cumulative["NL"], vec![0.0, 100.0, 100.0, 240.0]);
	assert_eq!(ds.global_diff, vec![0.0, 6.0, 3.0, 34.0]);
	let mut config = Config::default();
	config.labels.insert("NL".to_string(), "Netherlands".to_string());
	assert_eq!(ds.countries(&config).collect::<Vec<_>>(),
		   vec![("BE", "BE"), ("LU", "LU"), ("NL", "Netherlands")]);
    }

    #[test]
    fn top_charts_add_global_and_other() {
	let ds = dataset();
	let mut config = Config::default();
	config.labels.insert("BE".to_string(), "Belgium".to_string());
	let charts = ds.top_charts(1, &config);
	let labels: Vec<&str> = charts.iter().map(|c| c.label.as_str()).collect();
	assert_eq!(labels, vec!["Global", "Belgium", "Other"]);
	let other: Vec<f64> = charts[2].points.iter().map(|p| p.y).collect();
	assert_eq!(other, vec![0.0, 5.0, 0.0, 8.0]);
    }

    #[test]
    fn common_window_and_unknown_country() {
	let ds = dataset();
	assert_eq!(ds.common_window(&["NL", "LU"]).unwrap(), 0);
	assert_eq!(ds.common_window(&["LU"]).unwrap(), 2);
	assert!(matches!(ds.common_window(&["XX"]), Err(Error::MissingRegion(_))));
	assert!(matches!(
	    ds.infection_estimate("XX", &InfectionParams::default(), &KalmanParams::default()),
	    Err(Error::MissingRegion(_))));
    }

    #[test]
    fn infection_estimate_spans_date_axis() {
	let ds = dataset();
	let params = InfectionParams { lag_days: 1, ..Default::default() };
	let est = ds.infection_estimate("NL", &params, &KalmanParams::default()).unwrap();
	assert_eq!(est.len(), ds.dates.len());
	assert_eq!(est[0], 500.0);
    }

    #[test]
    fn empty_dataset_is_valid() {
	let ds = Dataset::from_observations(&[], &Config::default()).unwrap();
	assert!(ds.dates.is_empty());
	assert!(ds.global_diff.is_empty());
	assert!(ds.top_countries(7).ranked.is_empty());
    }
}
