use std::{io,num};

use chrono::naive::NaiveDate;
use thiserror::Error;


pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    IO(#[from] io::Error),
    #[error("CSV error: {0}")]
    CSV(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JSON(#[from] serde_json::Error),
    #[error("Date parse error: {0}")]
    ParseDate(#[from] chrono::format::ParseError),
    #[error("Number parse error: {0}")]
    ParseFloat(#[from] num::ParseFloatError),
    #[error("Invalid {0} count: {1}")]
    InvalidCount(&'static str, String),
    #[error("Date {0} missing from the date axis")]
    MissingDate(NaiveDate),
    #[error("Missing region: {0}")]
    MissingRegion(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
