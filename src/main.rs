/// TideWatch command-line front end.
///
/// Usage:
///   tidewatch_service assess <lat> <lon> [address]
///   tidewatch_service assess <sample name>
///   tidewatch_service tides [hours]
///   tidewatch_service forecast
///   tidewatch_service samples
///   tidewatch_service subscribe <subscriptions.toml> <phone> <lat> <lon> [grade] [address]
///   tidewatch_service unsubscribe <subscriptions.toml> <phone>
///   tidewatch_service subscriptions <subscriptions.toml>
///   tidewatch_service check-alerts <subscriptions.toml>
///   tidewatch_service verify
///   tidewatch_service info
///
/// Results are printed as JSON on stdout; logs go to stderr and, when
/// configured, to the log file.

use std::error::Error;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::json;

use tidewatch_service::alert::cycle::run_alert_cycle;
use tidewatch_service::alert::notify::{Dispatcher, transport_from_settings};
use tidewatch_service::alert::subscriptions::{
    SubscriptionStore, format_subscription_toml, load_subscriptions_toml, save_subscriptions_toml,
};
use tidewatch_service::alert::thresholds::{DEFAULT_THRESHOLD, parse_threshold};
use tidewatch_service::assess::Assessor;
use tidewatch_service::config::Settings;
use tidewatch_service::locations::{SAMPLE_LOCATIONS, find_sample};
use tidewatch_service::logging::{self, DataSource};
use tidewatch_service::model::{AlertSubscription, AssessmentError};
use tidewatch_service::verify;

const USAGE: &str = "usage: tidewatch_service <assess|tides|forecast|samples|subscribe|unsubscribe|subscriptions|check-alerts|verify|info> [args]";

fn main() -> Result<(), Box<dyn Error>> {
    let settings = Settings::load()?;
    logging::init_logger(
        settings.log_level()?,
        settings.logging.file.as_deref(),
        settings.logging.console_timestamps,
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        return Err(USAGE.into());
    };
    let rest = &args[1..];

    match command.as_str() {
        "assess" => cmd_assess(&settings, rest),
        "tides" => cmd_tides(&settings, rest),
        "forecast" => cmd_forecast(&settings),
        "samples" => print_json(&SAMPLE_LOCATIONS),
        "subscribe" => cmd_subscribe(&settings, rest),
        "unsubscribe" => cmd_unsubscribe(rest),
        "subscriptions" => cmd_subscriptions(rest),
        "check-alerts" => cmd_check_alerts(&settings, rest),
        "verify" => cmd_verify(&settings),
        "info" => cmd_info(&settings),
        other => Err(format!("unknown command '{}'\n{}", other, USAGE).into()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_coordinate(raw: &str, what: &str) -> Result<f64, Box<dyn Error>> {
    raw.parse::<f64>()
        .map_err(|_| format!("{} '{}' is not a number", what, raw).into())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_assess(settings: &Settings, args: &[String]) -> Result<(), Box<dyn Error>> {
    let (address, latitude, longitude) = match args {
        [lat, lon, address @ ..] if lat.parse::<f64>().is_ok() => {
            let latitude = parse_coordinate(lat, "latitude")?;
            let longitude = parse_coordinate(lon, "longitude")?;
            let address = if address.is_empty() {
                format!("{:.4}, {:.4}", latitude, longitude)
            } else {
                address.join(" ")
            };
            (address, latitude, longitude)
        }
        [] => return Err("assess needs <lat> <lon> [address] or a sample location name".into()),
        name => {
            let name = name.join(" ");
            let sample = find_sample(&name).ok_or_else(|| format!("no sample location named '{}'", name))?;
            (sample.address.to_string(), sample.latitude, sample.longitude)
        }
    };

    let assessor = Assessor::from_settings(settings)?;
    match assessor.assess(&address, latitude, longitude) {
        Ok(assessment) => print_json(&assessment),
        Err(e @ AssessmentError::OutsideCoverage { .. }) => Err(format!(
            "{} (covered area: {})",
            e,
            settings.coverage.describe()
        )
        .into()),
    }
}

fn cmd_tides(settings: &Settings, args: &[String]) -> Result<(), Box<dyn Error>> {
    let hours = match args.first() {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| format!("hours '{}' is not a whole number", raw))?,
        None => settings.noaa.prediction_hours,
    };

    let assessor = Assessor::from_settings(settings)?;
    let tide = assessor.tide();
    print_json(&json!({
        "station_id": tide.station_id(),
        "station_name": settings.noaa.station_name,
        "current": tide.current(),
        "predictions": tide.predictions(hours),
    }))
}

fn cmd_forecast(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let assessor = Assessor::from_settings(settings)?;
    print_json(&assessor.weather().forecast())
}

fn cmd_subscribe(settings: &Settings, args: &[String]) -> Result<(), Box<dyn Error>> {
    let [path, phone, lat, lon, extra @ ..] = args else {
        return Err("subscribe needs <subscriptions.toml> <phone> <lat> <lon> [grade] [address]".into());
    };
    let latitude = parse_coordinate(lat, "latitude")?;
    let longitude = parse_coordinate(lon, "longitude")?;
    if !settings.coverage.contains(latitude, longitude) {
        return Err(AssessmentError::OutsideCoverage { latitude, longitude }.into());
    }

    let threshold_grade = extra.first().map(|g| parse_threshold(g)).unwrap_or(DEFAULT_THRESHOLD);
    let address = if extra.len() > 1 {
        extra[1..].join(" ")
    } else {
        format!("{:.4}, {:.4}", latitude, longitude)
    };
    let subscription = AlertSubscription {
        phone_number: phone.clone(),
        address,
        latitude,
        longitude,
        threshold_grade,
    };

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "\n{}", format_subscription_toml(&subscription)?)?;
    logging::info(
        DataSource::Alerts,
        Some(phone.as_str()),
        &format!("Appended subscription to {}", path),
    );
    print_json(&subscription)
}

fn cmd_unsubscribe(args: &[String]) -> Result<(), Box<dyn Error>> {
    let [path, phone] = args else {
        return Err("unsubscribe needs <subscriptions.toml> <phone>".into());
    };

    let store = SubscriptionStore::new();
    load_subscriptions_toml(&store, Path::new(path))?;
    let removed = store.unsubscribe(phone);
    if removed {
        let remaining = save_subscriptions_toml(&store, Path::new(path))?;
        logging::info(
            DataSource::Alerts,
            Some(phone.as_str()),
            &format!("Removed from {} ({} remaining)", path, remaining),
        );
    } else {
        logging::warn(
            DataSource::Alerts,
            Some(phone.as_str()),
            &format!("No subscription in {}", path),
        );
    }
    print_json(&json!({
        "phone_number": phone,
        "removed": removed,
    }))
}

fn cmd_subscriptions(args: &[String]) -> Result<(), Box<dyn Error>> {
    let path = args
        .first()
        .ok_or("subscriptions needs <subscriptions.toml>")?;

    let store = SubscriptionStore::new();
    load_subscriptions_toml(&store, Path::new(path))?;
    let subscriptions = store.list();
    print_json(&json!({
        "count": subscriptions.len(),
        "subscriptions": subscriptions,
    }))
}

fn cmd_check_alerts(settings: &Settings, args: &[String]) -> Result<(), Box<dyn Error>> {
    let path = args
        .first()
        .ok_or("check-alerts needs <subscriptions.toml>")?;

    let store = SubscriptionStore::new();
    let loaded = load_subscriptions_toml(&store, Path::new(path))?;
    logging::info(
        DataSource::Alerts,
        None,
        &format!("Loaded {} subscriptions from {}", loaded, path),
    );

    let assessor = Assessor::from_settings(settings)?;
    let dispatcher = Dispatcher::new(transport_from_settings(&settings.twilio, settings.request_timeout()));
    let notifications = run_alert_cycle(&assessor, &store, &dispatcher);
    print_json(&notifications)
}

fn cmd_verify(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let report = verify::run_full_verification(settings)?;
    verify::print_summary(&report);

    let out = "verification_report.json";
    std::fs::write(out, serde_json::to_string_pretty(&report)?)?;
    println!("\n📄 Full report written to {}", out);
    Ok(())
}

fn cmd_info(settings: &Settings) -> Result<(), Box<dyn Error>> {
    print_json(&json!({
        "name": settings.app_name,
        "version": env!("CARGO_PKG_VERSION"),
        "coverage": settings.coverage.describe(),
        "tide_station": {
            "id": settings.noaa.station_id,
            "name": settings.noaa.station_name,
        },
        "forecast_grid": settings.nws.grid().to_string(),
        "weights": settings.scoring.weights,
        "sms_enabled": settings.twilio.is_configured(),
        "data_sources": [
            "NOAA CO-OPS Tides & Currents",
            "National Weather Service",
            "USGS Elevation Point Query Service",
        ],
    }))
}
