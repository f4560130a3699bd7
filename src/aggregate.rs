use chrono::naive::NaiveDate;
use serde::{Serialize,Deserialize};

use super::normalize::CountrySeries;


#[derive(Serialize,Deserialize,Clone,Copy,Debug,PartialEq)]
pub struct Point {
    pub x: NaiveDate,
    pub y: f64,
}

/// A labelled series ready to be plotted against the date axis.
#[derive(Serialize,Deserialize,Clone,Debug,PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<Point>,
}

impl ChartSeries {

    pub fn new(label: &str, dates: &[NaiveDate], values: &[f64]) -> Self {
	Self {
	    label: label.to_string(),
	    points: dates.iter().zip(values).map(
		|(date,value)| Point { x: *date, y: *value }
	    ).collect()
	}
    }

    /// Drops the points before `start`.
    pub fn trimmed(mut self, start: usize) -> Self {
	self.points.drain(..start.min(self.points.len()));
	self
    }

}


pub fn sum_series<'a, I>(data: I, len: usize) -> Vec<f64>
where I: IntoIterator<Item = &'a Vec<f64>> {
    let mut result = vec![0.0; len];
    for series in data {
	for (sum,val) in result.iter_mut().zip(series) {
	    *sum += *val;
	}
    }
    result
}


pub fn global_total(diffs: &CountrySeries, len: usize) -> Vec<f64> {
    sum_series(diffs.values(), len)
}


#[derive(Clone,Debug,PartialEq)]
pub struct TopN {
    pub ranked: Vec<(String,Vec<f64>)>,
    pub other: Vec<f64>,
}

/// Splits `global` into the `n` countries with the highest final
/// cumulative count and the remainder.
pub fn top_n(cumulative: &CountrySeries, diffs: &CountrySeries,
	     global: &[f64], n: usize) -> TopN {

    let mut ranking: Vec<(&String,f64)> = cumulative.iter().map(
	|(country,series)| (country, series.last().cloned().unwrap_or(0.0))
    ).collect();
    ranking.sort_by(|a,b| b.1.total_cmp(&a.1));

    let ranked: Vec<(String,Vec<f64>)> = ranking.into_iter()
	.filter_map(|(country,_)| diffs.get(country).map(|d| (country.clone(), d.clone())))
	.take(n)
	.collect();

    let combined = sum_series(ranked.iter().map(|(_,d)| d), global.len());
    let other = global.iter().zip(&combined).map(|(g,c)| g - c).collect();

    TopN { ranked, other }

}


/// Index one before the earliest strictly positive value in any series,
/// or 0 when none is positive.
pub fn common_window_start(series: &[&[f64]]) -> usize {
    series.iter()
	.filter_map(|s| s.iter().position(|v| *v > 0.0))
	.min()
	.map_or(0, |first| first.saturating_sub(1))
}
