use std::env;
use std::path::PathBuf;
use std::process;
use student_insight::history::PredictionStore;
use student_insight::scoring::{evaluate, FeatureName, FeatureRecord};
use student_insight::settings::settings;
use student_insight::utils::{
    log_init, log_missing_features, log_ml_error, log_ml_loading, log_ml_ready, log_probe_header,
    log_probe_result, log_saved, print_assessment, print_statistics,
};
use student_insight::{BinaryClassifier, LogisticModel, Predictor};

/// Reference students used to check what the artifact outputs per band.
const PROBE_PROFILES: &[(&str, [f64; 5])] = &[
    ("Excellent", [100.0, 40.0, 40.0, 10.0, 8.0]),
    ("Good", [85.0, 35.0, 35.0, 8.0, 5.0]),
    ("Average", [75.0, 28.0, 28.0, 7.0, 3.0]),
    ("Poor", [50.0, 15.0, 15.0, 4.0, 1.0]),
];

fn print_usage() {
    eprintln!("Usage: score-student [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --attendance <n>    Attendance percentage (0-100)");
    eprintln!("  --test1 <n>         Internal Test 1 marks (0-40)");
    eprintln!("  --test2 <n>         Internal Test 2 marks (0-40)");
    eprintln!("  --assignment <n>    Assignment marks (0-10)");
    eprintln!("  --study-hours <n>   Daily study hours");
    eprintln!("  --id <student>      Student identifier");
    eprintln!("  --model <path>      Model artifact (defaults to settings)");
    eprintln!("  --save              Record the prediction in history");
    eprintln!("  --probe             Run the reference profiles through the model");
    eprintln!("  --stats             Print history statistics");
}

#[derive(Debug, Default)]
struct Args {
    record: FeatureRecord,
    model: Option<PathBuf>,
    save: bool,
    probe: bool,
    stats: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut i = 0usize;
    while i < args.len() {
        let flag = args[i].as_str();
        let feature = match flag {
            "--attendance" => Some(FeatureName::Attendance),
            "--test1" => Some(FeatureName::InternalTest1),
            "--test2" => Some(FeatureName::InternalTest2),
            "--assignment" => Some(FeatureName::Assignment),
            "--study-hours" => Some(FeatureName::StudyHours),
            _ => None,
        };

        match flag {
            "--save" => parsed.save = true,
            "--probe" => parsed.probe = true,
            "--stats" => parsed.stats = true,
            "--id" | "--model" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| format!("missing value for {flag}"))?;
                if flag == "--id" {
                    parsed.record.student_id = Some(value.clone());
                } else {
                    parsed.model = Some(PathBuf::from(value));
                }
            }
            _ => {
                let feature = feature.ok_or_else(|| format!("unknown argument: {flag}"))?;
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| format!("missing value for {flag}"))?;
                let value: f64 = value
                    .parse()
                    .map_err(|_| format!("invalid number for {flag}: {value}"))?;
                parsed.record.values.insert(feature.key().to_string(), value);
            }
        }
        i += 1;
    }
    Ok(parsed)
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        print_usage();
        process::exit(1);
    }
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            process::exit(1);
        }
    };

    let s = settings();
    let model_path = args
        .model
        .clone()
        .unwrap_or_else(|| s.model.artifact_path.clone());
    log_init(&model_path, &s.storage.history_path);

    log_ml_loading();
    let model = match LogisticModel::load(&model_path) {
        Ok(model) => model,
        Err(e) => {
            log_ml_error(&e.to_string());
            process::exit(1);
        }
    };
    log_ml_ready(model.model_type());
    println!();

    if args.probe {
        probe(&model);
    }

    if !args.record.values.is_empty() || args.record.student_id.is_some() {
        score_student(&args, &model);
    }

    if args.stats || args.save {
        let store = match PredictionStore::open(&s.storage.history_path) {
            Ok(store) => store,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        };
        let predictor = Predictor::new(std::sync::Arc::new(model), store);
        if args.save {
            match predictor.score(&args.record) {
                Ok(result) => log_saved(predictor.record(&args.record, &result)),
                Err(e) => eprintln!("not saved: {e}"),
            }
            println!();
        }
        if args.stats {
            print_statistics(&predictor.statistics());
        }
    }
}

fn probe(model: &LogisticModel) {
    log_probe_header();
    for (i, (name, values)) in PROBE_PROFILES.iter().enumerate() {
        let features = FeatureName::ordered()
            .into_iter()
            .zip(values.iter().copied())
            .fold(FeatureRecord::new(), |r, (f, v)| r.with(f, v));
        let Ok(features) = features.validate() else {
            continue;
        };
        match evaluate(model, &features) {
            Ok(assessment) => {
                log_probe_result(name, &assessment, i + 1 == PROBE_PROFILES.len())
            }
            Err(e) => log_ml_error(&e.to_string()),
        }
    }
    println!();
}

fn score_student(args: &Args, model: &LogisticModel) {
    let features = match args.record.validate() {
        Ok(features) => features,
        Err(e) => {
            log_missing_features(&e);
            process::exit(2);
        }
    };

    match evaluate(model, &features) {
        Ok(assessment) => print_assessment(args.record.student_id.as_deref(), &assessment),
        Err(e) => {
            log_ml_error(&e.to_string());
            process::exit(1);
        }
    }
}
