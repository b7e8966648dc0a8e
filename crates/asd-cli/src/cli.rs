use clap::{Arg, ArgAction, Command, ValueHint};
use std::path::PathBuf;

const PRESETS: [&str; 2] = ["correlation-elimination", "constant-elimination"];

fn preset_arg() -> Arg {
    Arg::new("preset")
        .short('p')
        .long("preset")
        .help("Built-in pipeline to start from when no configuration file is given.")
        .value_parser(PRESETS)
        .value_hint(ValueHint::Other)
}

/// Command line definition of the `asd` binary.
pub fn build_cli() -> Command {
    Command::new("asd")
        .version(clap::crate_version!())
        .about("ASD screening - chi-square feature selection and tree classifiers on tabular data")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Train on the training table and write predictions for the test table")
                .arg(
                    Arg::new("config")
                        .help("Path to a pipeline JSON configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("train_data")
                        .short('t')
                        .long("train")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the labelled training table. Overrides the training data file \
                             specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("test_data")
                        .short('e')
                        .long("test")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the unlabelled test table. Overrides the test data file \
                             specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("File path the ID,Predicted submission is written to.")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(preset_arg().conflicts_with("config"))
                .arg(
                    Arg::new("correlation_plot")
                        .long("correlation-plot")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Also write an HTML heatmap of the selected feature correlations.")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("quiet")
                        .short('q')
                        .long("quiet")
                        .help("Do not echo the preset configuration to stderr.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("template")
                .about("Print a pipeline configuration to use as a starting point")
                .arg(preset_arg()),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
}
