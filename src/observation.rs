use std::io;
use std::fs::File;
use std::path::Path;

use chrono::naive::NaiveDate;
use serde::{Serialize,Deserialize};
use serde_json::Value;
use tracing::{debug,info,warn};

use super::error::{Result,Error};


/// One cumulative report of a country on a given date.
#[derive(Serialize,Deserialize,Clone,Debug,PartialEq)]
pub struct Observation {
    pub country: String,
    pub date: NaiveDate,
    pub deaths: f64,
    pub cases: f64,
}


/// A count as it comes from upstream: sometimes a number, sometimes
/// a numeric string.
#[derive(Serialize,Deserialize,Clone,Debug,PartialEq)]
#[serde(untagged)]
pub enum Count {
    Number(f64),
    Text(String),
}

#[derive(Serialize,Deserialize,Clone,Debug,PartialEq)]
pub struct Record {
    #[serde(default)]
    pub countrycode: Option<String>,
    pub date: String,
    #[serde(alias = "totaldeaths")]
    pub deaths: Option<Count>,
    #[serde(default, alias = "confirmed", alias = "totalcases")]
    pub cases: Option<Count>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Envelope { data: Vec<Value> },
    Bare(Vec<Value>),
}

#[derive(Deserialize)]
struct CsvRecord {
    countrycode: Option<String>,
    date: String,
    deaths: Option<String>,
    cases: Option<String>,
}


/// Records read from one document, and the number of entries that did
/// not have the shape of a record.
#[derive(Clone,Debug,Default)]
pub struct Records {
    pub records: Vec<Record>,
    pub malformed: usize,
}

#[derive(Clone,Debug,Default)]
pub struct Ingested {
    pub observations: Vec<Observation>,
    pub rejected: usize,
}


pub fn parse_date(date: &str) -> Result<NaiveDate> {
    let date = date.trim();
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
	Ok(date) => Ok(date),
	Err(_) => Ok(NaiveDate::parse_from_str(date, "%m/%d/%Y")?),
    }
}


fn parse_count(field: &'static str, count: Option<&Count>) -> Result<f64> {
    let value = match count {
	None => return Err(Error::InvalidCount(field, "missing".to_string())),
	Some(Count::Number(v)) => *v,
	Some(Count::Text(s)) if s.trim().is_empty() => 0.0,
	Some(Count::Text(s)) => s.trim().parse()?,
    };
    match value.is_finite() && value >= 0.0 {
	true => Ok(value),
	false => Err(Error::InvalidCount(field, value.to_string())),
    }
}


impl Record {

    /// `Ok(None)` for records without a country code.
    pub fn to_observation(&self) -> Result<Option<Observation>> {
	let country = match self.countrycode.as_ref().map(|c| c.trim()) {
	    None | Some("") => return Ok(None),
	    Some(c) => c.to_string(),
	};
	Ok(Some(Observation {
	    country,
	    date: parse_date(&self.date)?,
	    deaths: parse_count("deaths", self.deaths.as_ref())?,
	    cases: match self.cases.as_ref() {
		None => 0.0,
		cases => parse_count("cases", cases)?,
	    },
	}))
    }

}


/// Converts records, dropping those without a country and rejecting
/// malformed ones one by one.
pub fn ingest(records: &Records) -> Ingested {

    let mut result = Ingested { rejected: records.malformed, ..Default::default() };
    let mut anonymous = 0;

    for (i,record) in records.records.iter().enumerate() {
	match record.to_observation() {
	    Ok(Some(obs)) => result.observations.push(obs),
	    Ok(None) => anonymous += 1,
	    Err(err) => {
		warn!("rejecting record {} ({:?}, {}): {}",
		      i, record.countrycode, record.date, err);
		result.rejected += 1;
	    }
	}
    }

    debug!("dropped {} records without country code", anonymous);
    info!("ingested {} observations, rejected {}",
	  result.observations.len(), result.rejected);
    result

}


pub fn records_from_json<R: io::Read>(reader: R) -> Result<Records> {

    let entries = match serde_json::from_reader(reader)? {
	Document::Envelope { data } => data,
	Document::Bare(data) => data,
    };

    let mut result = Records::default();
    for (i,entry) in entries.into_iter().enumerate() {
	match serde_json::from_value(entry) {
	    Ok(record) => result.records.push(record),
	    Err(err) => {
		warn!("skipping entry {}: {}", i, err);
		result.malformed += 1;
	    }
	}
    }
    Ok(result)

}


pub fn records_from_csv<R: io::Read>(reader: R) -> Result<Records> {

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut result = Records::default();

    for (i,row) in reader.deserialize::<CsvRecord>().enumerate() {
	match row {
	    Ok(r) => result.records.push(Record {
		countrycode: r.countrycode,
		date: r.date,
		deaths: r.deaths.map(Count::Text),
		cases: r.cases.map(Count::Text),
	    }),
	    Err(err) if err.is_io_error() => return Err(err.into()),
	    Err(err) => {
		warn!("skipping row {}: {}", i + 1, err);
		result.malformed += 1;
	    }
	}
    }
    Ok(result)

}


/// Reads a CSV file when the extension says so, JSON otherwise.
pub fn records_from_path(path: &Path) -> Result<Records> {
    let reader = io::BufReader::new(File::open(path)?);
    match path.extension().and_then(|e| e.to_str()) {
	Some(ext) if ext.eq_ignore_ascii_case("csv") => records_from_csv(reader),
	_ => records_from_json(reader),
    }
}
