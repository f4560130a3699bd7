use std::fs::File;
use std::io::{self,Write};
use std::path::{Path,PathBuf};

use anyhow::{Context,Result};
use chrono::naive::NaiveDate;
use clap::{ArgAction,Parser,ValueHint};
use serde::Serialize;
use tracing::{info,warn};
use tracing_subscriber::EnvFilter;

use corona_deaths::{ChartSeries,Config,Dataset,GapPolicy};
use corona_deaths::observation;


#[derive(Parser, Debug)]
#[command(author, version, about = "Estimate daily infections from reported deaths", long_about = None)]
struct Cli {
    /// Dataset file (JSON records, or CSV with a header row)
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// JSON configuration file
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Country codes to estimate infections for
    #[arg(long = "country", action = ArgAction::Append)]
    countries: Vec<String>,

    /// Assumed fatality rate in percent
    #[arg(long)]
    death_rate: Option<f64>,

    /// Days between infection and death
    #[arg(long)]
    lag: Option<usize>,

    /// Number of countries shown separately from the remainder
    #[arg(long)]
    top: Option<usize>,

    /// Fill unreported days with the last reported total
    #[arg(long, action = ArgAction::SetTrue)]
    carry_forward: bool,

    /// Report output path (`-` for stdout)
    #[arg(short, long, default_value = "-", value_hint = ValueHint::FilePath)]
    output: PathBuf,
}


#[derive(Serialize)]
struct CountryReport {
    code: String,
    label: String,
    cumulative: ChartSeries,
    daily: ChartSeries,
    smoothed: ChartSeries,
    infections: ChartSeries,
}

#[derive(Serialize)]
struct Report {
    dates: Vec<NaiveDate>,
    rejected: usize,
    top: Vec<ChartSeries>,
    countries: Vec<CountryReport>,
}


fn main() -> Result<()> {

    tracing_subscriber::fmt()
	.with_env_filter(EnvFilter::try_from_default_env()
			 .unwrap_or_else(|_| EnvFilter::new("info")))
	.with_writer(io::stderr)
	.init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let records = observation::records_from_path(&cli.input)
	.with_context(|| format!("reading {}", cli.input.display()))?;
    let ingested = observation::ingest(&records);
    let dataset = Dataset::from_observations(&ingested.observations, &config)
	.context("normalizing observations")?;

    for code in &cli.countries {
	if !dataset.deaths.cumulative.contains_key(code) {
	    warn!("no data for country {}", code);
	}
    }
    let selected: Vec<(&str,&str)> = dataset.countries(&config)
	.filter(|(code,_)| cli.countries.iter().any(|c| c.as_str() == *code))
	.collect();
    let codes: Vec<&str> = selected.iter().map(|(code,_)| *code).collect();
    let start = dataset.common_window(&codes)?;

    let countries = selected.iter().filter_map(
	|(code,label)| match country_report(&dataset, &config, code, label, start) {
	    Ok(report) => Some(report),
	    Err(err) => { warn!("infection estimate for {}: {}", code, err); None }
	}
    ).collect();

    let report = Report {
	dates: dataset.dates.clone(),
	rejected: ingested.rejected,
	top: dataset.top_charts(config.top_n, &config),
	countries,
    };

    write_report(&cli.output, &report)?;
    info!("report written to {}", cli.output.display());

    Ok(())

}


fn load_config(cli: &Cli) -> Result<Config> {

    let mut config = match &cli.config {
	Some(path) => Config::from_path(path)
	    .with_context(|| format!("loading config {}", path.display()))?,
	None => Config::default(),
    };

    if let Some(rate) = cli.death_rate {
	config.infection.death_rate_percent = rate;
    }
    if let Some(lag) = cli.lag {
	config.infection.lag_days = lag;
    }
    if let Some(top) = cli.top {
	config.top_n = top;
    }
    if cli.carry_forward {
	config.gap_policy = GapPolicy::CarryForward;
    }

    config.infection.validate()?;
    config.kalman.validate()?;
    Ok(config)

}


fn country_report(dataset: &Dataset, config: &Config, code: &str, label: &str,
		  start: usize) -> corona_deaths::Result<CountryReport> {
    let infections = dataset.infection_estimate(code, &config.infection, &config.kalman)?;
    let deaths = &dataset.deaths;
    Ok(CountryReport {
	code: code.to_string(),
	label: label.to_string(),
	cumulative: dataset.chart(label, &deaths.cumulative[code]).trimmed(start),
	daily: dataset.chart(label, &deaths.diff[code]).trimmed(start),
	smoothed: dataset.chart(label, &deaths.smoothed[code]).trimmed(start),
	infections: dataset.chart(label, &infections).trimmed(start),
    })
}


fn write_report(path: &Path, report: &Report) -> Result<()> {
    if path == Path::new("-") {
	let stdout = io::stdout();
	let mut out = stdout.lock();
	serde_json::to_writer_pretty(&mut out, report)?;
	writeln!(out)?;
    } else {
	let mut out = io::BufWriter::new(File::create(path)
	    .with_context(|| format!("creating {}", path.display()))?);
	serde_json::to_writer_pretty(&mut out, report)?;
	out.flush()?;
    }
    Ok(())
}
