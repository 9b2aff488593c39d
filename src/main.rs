use anyhow::{bail, Context, Result};
use serde_json::json;
use std::io::Read;
use std::process;
use student_insight::settings::settings;
use student_insight::{EngineError, FeatureRecord, Predictor};
use tracing::info;
use tracing::subscriber::set_global_default;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn print_usage() {
    eprintln!("Usage: student-insight <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  predict <json|->   Score a feature record and save it to history");
    eprintln!("  predictions        List every saved prediction");
    eprintln!("  statistics         Summarize saved predictions");
    eprintln!("  status             Describe the loaded engine");
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", json!({ "error": format!("{e:#}") }));
        process::exit(1);
    }
}

fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let s = settings();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(s.logging.filter.parse()?))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        );
    set_global_default(subscriber).context("failed to set tracing subscriber")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        process::exit(1);
    };

    let predictor = Predictor::from_settings(s).context("AI system not initialized")?;
    info!(
        model = %s.model.artifact_path.display(),
        history = %s.storage.history_path.display(),
        "AI/ML system initialized"
    );

    let response = match command.as_str() {
        "predict" => predict(&predictor, args.get(1).map(String::as_str))?,
        "predictions" => {
            let predictions = predictor.all_history();
            json!({
                "success": true,
                "count": predictions.len(),
                "predictions": predictions,
            })
        }
        "statistics" => json!({
            "success": true,
            "statistics": predictor.statistics(),
        }),
        "status" => json!(predictor.status()),
        other => {
            print_usage();
            bail!("unknown command: {other}");
        }
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn predict(predictor: &Predictor, input: Option<&str>) -> Result<serde_json::Value> {
    let raw = match input {
        Some("-") | None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
        Some(text) => text.to_string(),
    };
    if raw.trim().is_empty() {
        bail!("No data provided");
    }

    let record: FeatureRecord = serde_json::from_str(&raw).context("invalid feature record")?;

    match predictor.predict_and_record(&record) {
        Ok(outcome) => Ok(json!({
            "success": true,
            "prediction": outcome.prediction,
            "saved": outcome.recorded,
            "input": record,
        })),
        Err(EngineError::Validation(e)) => {
            println!(
                "{}",
                json!({
                    "error": "Missing required features",
                    "missing": e.missing(),
                })
            );
            process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}
