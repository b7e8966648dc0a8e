use anyhow::Result;
use clap::ArgMatches;
use log::LevelFilter;
use std::str::FromStr;

use asd_classifiers::config::{PipelineConfig, Preset};
use asd_classifiers::Pipeline;
use asd_cli::cli::build_cli;
use asd_cli::run::input::RunConfig;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("ASD_LOG", "error,asd=info"))
        .init();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => handle_run(run_matches),
        Some(("template", template_matches)) => handle_template(template_matches),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_run(matches: &ArgMatches) -> Result<()> {
    let params = RunConfig::from_arguments(matches)?;

    match &params.config_path {
        Some(path) => log::info!("[ASD] Running pipeline from config: {:?}", path),
        None => {
            eprintln!("[ASD] No config file provided; using preset.");
            if !matches.get_flag("quiet") {
                eprintln!("[ASD] Pipeline config:\n{}", params.to_json()?);
            }
        }
    }

    if let Err(e) = params.validate() {
        log::error!("Invalid arguments: {:#}", e);
        std::process::exit(1)
    }

    match Pipeline::new(params.pipeline).run() {
        Ok(output) => {
            log::info!(
                "[ASD] Wrote {} predictions (training accuracy {:.4})",
                output.submission.len(),
                output.training_accuracy
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Pipeline failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_template(matches: &ArgMatches) -> Result<()> {
    let preset = match matches.get_one::<String>("preset") {
        Some(name) => Preset::from_str(name).map_err(anyhow::Error::msg)?,
        None => Preset::default(),
    };
    let config = PipelineConfig::preset(preset);
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
