//! CLI that reads an analyzer input document from stdin and prints one JSON
//! report per page to stdout. Logs go to stderr (`RUST_LOG`, default `info`).

use std::io::{self, Read};
use std::process::ExitCode;

use rs_page_analyzer::{AnalyzerInput, Options};
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).with_target(true))
        .init();

    let mut raw = String::new();
    if let Err(err) = io::stdin().read_to_string(&mut raw) {
        tracing::error!(error = %err, "failed to read stdin");
        return ExitCode::FAILURE;
    }

    let input = match AnalyzerInput::from_json(&raw) {
        Ok(input) => input,
        Err(err) => {
            tracing::error!(error = %err, "received invalid input");
            return ExitCode::FAILURE;
        }
    };

    let reports: Vec<Value> = input
        .pages
        .iter()
        .zip(input.analyze(&Options::default()))
        .map(|(page, outcome)| match outcome {
            Ok(report) => serde_json::to_value(&report).unwrap_or_else(|err| {
                json!({ "url": page.url, "error": err.to_string() })
            }),
            Err(err) => {
                tracing::warn!(url = %page.url, error = %err, "page analysis failed");
                json!({ "url": page.url, "error": err.to_string() })
            }
        })
        .collect();

    match serde_json::to_string_pretty(&reports) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize reports");
            ExitCode::FAILURE
        }
    }
}
