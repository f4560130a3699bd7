use std::collections::BTreeMap;

use chrono::naive::NaiveDate;
use serde::{Serialize,Deserialize};

use super::config::GapPolicy;
use super::error::{Result,Error};
use super::observation::Observation;


pub type CountrySeries = BTreeMap<String,Vec<f64>>;

#[derive(Serialize,Deserialize,Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Deaths,
    Cases,
}

impl Metric {

    fn value(&self, obs: &Observation) -> f64 {
	match self {
	    Self::Deaths => obs.deaths,
	    Self::Cases => obs.cases,
	}
    }

}


/// Dense cumulative series, one entry per date of `dates` for every country.
#[derive(Serialize,Clone,Debug,Default,PartialEq)]
pub struct Normalized {
    pub dates: Vec<NaiveDate>,
    pub deaths: CountrySeries,
    pub cases: CountrySeries,
}

pub fn normalize(observations: &[Observation], gaps: GapPolicy) -> Result<Normalized> {

    let mut sorted: Vec<&Observation> = observations.iter().collect();
    sorted.sort_by_key(|obs| obs.date);

    let mut dates: Vec<NaiveDate> = sorted.iter().map(|obs| obs.date).collect();
    dates.dedup();

    let mut seen: BTreeMap<&str,Vec<bool>> = BTreeMap::new();
    let mut deaths = CountrySeries::new();
    let mut cases = CountrySeries::new();

    for obs in sorted {
	let index = dates.binary_search(&obs.date)
	    .map_err(|_| Error::MissingDate(obs.date))?;
	seen.entry(obs.country.as_str()).or_insert_with(|| vec![false; dates.len()])[index] = true;
	for (metric,series) in [(Metric::Deaths, &mut deaths), (Metric::Cases, &mut cases)] {
	    series.entry(obs.country.clone()).or_insert_with(|| vec![0.0; dates.len()])
		[index] = metric.value(obs);
	}
    }

    if gaps == GapPolicy::CarryForward {
	for (country,seen) in seen.iter() {
	    for series in [&mut deaths, &mut cases] {
		if let Some(values) = series.get_mut(*country) {
		    carry_forward(values, seen);
		}
	    }
	}
    }

    Ok(Normalized { dates, deaths, cases })

}


/// Fills every unobserved slot after the first observed one with the
/// previous value.
fn carry_forward(values: &mut [f64], seen: &[bool]) {
    let mut started = false;
    for i in 0..values.len() {
	match (seen[i], started) {
	    (true,_) => started = true,
	    (false,true) => values[i] = values[i-1],
	    (false,false) => {}
	}
    }
}
