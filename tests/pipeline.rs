//! End-to-end run: upstream JSON document to chart-ready series and an
//! infection estimate, the way the binary drives the library.
use approx::assert_relative_eq;
use corona_deaths::{observation,Config,Dataset,InfectionParams,KalmanParams};

/// Two weeks of cumulative deaths for three countries, in upstream
/// `MM/DD/YYYY` form, unordered, with string counts and a few bad records.
fn document() -> String {
    let nl = [0, 0, 1, 1, 3, 6, 10, 16, 24, 35, 48, 64, 83, 105];
    let it = [2, 5, 9, 15, 22, 30, 42, 58, 80, 107, 140, 180, 228, 285];
    let be = [0, 0, 0, 0, 0, 1, 1, 2, 2, 4, 7, 11, 16, 22];

    let mut records = Vec::new();
    for day in (0..14).rev() {
	let date = format!("03/{:02}/2020", day + 1);
	records.push(format!(r#"{{"countrycode":"NL","date":"{}","deaths":"{}","confirmed":"{}"}}"#,
			     date, nl[day], nl[day] * 30));
	records.push(format!(r#"{{"countrycode":"IT","date":"{}","deaths":{},"confirmed":{}}}"#,
			     date, it[day], it[day] * 12));
	if be[day] > 0 {
	    records.push(format!(r#"{{"countrycode":"BE","date":"{}","deaths":{}}}"#,
				 date, be[day]));
	}
    }
    records.push(r#"{"countrycode":null,"date":"03/01/2020","deaths":"1000"}"#.to_string());
    records.push(r#"{"countrycode":"NL","date":"31/31/2020","deaths":"1"}"#.to_string());
    records.push(r#"{"countrycode":"NL","date":"03/05/2020","deaths":"n/a"}"#.to_string());

    format!(r#"{{"tokens":[],"data":[{}]}}"#, records.join(","))
}

fn dataset() -> (Dataset, usize) {
    let records = observation::records_from_json(document().as_bytes()).unwrap();
    let ingested = observation::ingest(&records);
    let dataset = Dataset::from_observations(&ingested.observations, &Config::default()).unwrap();
    (dataset, ingested.rejected)
}

#[test]
fn builds_aligned_series() {
    let (ds, rejected) = dataset();
    assert_eq!(rejected, 2);
    assert_eq!(ds.dates.len(), 14);
    assert_eq!(ds.dates[0].to_string(), "2020-03-01");
    let mut config = Config::default();
    config.labels.insert("IT".to_string(), "Italy".to_string());
    assert_eq!(ds.countries(&config).collect::<Vec<_>>(),
	       vec![("BE", "BE"), ("IT", "Italy"), ("NL", "NL")]);

    for metric in [&ds.deaths, &ds.cases] {
	for map in [&metric.cumulative, &metric.diff, &metric.smoothed] {
	    assert!(map.values().all(|s| s.len() == 14));
	}
    }

    // leading days before Belgium reported are zero
    assert_eq!(&ds.deaths.cumulative["BE"][..6], &[0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    assert_eq!(ds.cases.cumulative["IT"][13], 285.0 * 12.0);

    for (country, cumulative) in &ds.deaths.cumulative {
	let rebuilt = corona_deaths::series::cumsum(&ds.deaths.diff[country]);
	assert_eq!(&rebuilt, cumulative);
	let smoothed: f64 = ds.deaths.smoothed[country].iter().sum();
	assert_relative_eq!(smoothed, cumulative[13], epsilon = 1e-9);
    }
}

#[test]
fn top_split_adds_up() {
    let (ds, _) = dataset();
    let charts = ds.top_charts(2, &Config::default());
    let labels: Vec<&str> = charts.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Global", "IT", "NL", "Other"]);

    for i in 0..14 {
	let parts: f64 = charts[1..].iter().map(|c| c.points[i].y).sum();
	assert_relative_eq!(parts, charts[0].points[i].y, epsilon = 1e-9);
    }
    let other: Vec<f64> = charts[3].points.iter().map(|p| p.y).collect();
    assert_eq!(other, ds.deaths.diff["BE"]);
}

#[test]
fn infection_estimate_is_extrapolated_and_stable() {
    let (ds, _) = dataset();
    let params = InfectionParams { death_rate_percent: 1.0, lag_days: 4, trend_days: 5 };
    let kalman = KalmanParams::default();

    let est = ds.infection_estimate("NL", &params, &kalman).unwrap();
    assert_eq!(est.len(), 14);
    assert!(est.iter().all(|v| *v >= 0.0 && v.fract() == 0.0));
    // the last lag_days have no deaths to invert but are extrapolated
    assert!(est[10..].iter().all(|v| *v > 0.0));

    let again = ds.infection_estimate("NL", &params, &kalman).unwrap();
    assert_eq!(est, again);

    let start = ds.common_window(&["NL", "BE"]).unwrap();
    assert_eq!(start, 1);
}
