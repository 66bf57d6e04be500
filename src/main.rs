use std::{env, process};

use anyhow::Context;
use log::info;
use neural_regressor::config::{DataSpec, RegressorSpec};
use serde_json::json;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!(
            "Usage: {} <config.json> <data.json> [update-config.json]",
            args[0]
        );
        process::exit(1);
    }

    if let Err(e) = run(&args[1], &args[2], args.get(3).map(String::as_str)) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(config: &str, data: &str, update: Option<&str>) -> anyhow::Result<()> {
    let regressor = RegressorSpec::from_path(config)
        .and_then(|spec| spec.resolve())
        .with_context(|| format!("loading the configuration at {config}"))?;
    let data = DataSpec::from_path(data).with_context(|| format!("loading the data at {data}"))?;

    let (mut fitted, mut cache, mut report) = regressor
        .fit(&data.features, &data.target)
        .context("fitting the regressor")?;

    if let Some(update) = update {
        let regressor = RegressorSpec::from_path(update)
            .and_then(|spec| spec.resolve())
            .with_context(|| format!("loading the update configuration at {update}"))?;

        info!("updating with {update}");
        (fitted, cache, report) = regressor
            .update(cache, fitted, &data.features, &data.target)
            .context("updating the regressor")?;
    }

    let predictions = fitted
        .predict(&data.features)
        .context("predicting on the training features")?;

    let output = json!({
        "report": report,
        "shape": fitted.shape(),
        "batches": cache.batches().len(),
        "predictions": predictions,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
