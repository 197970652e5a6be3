//! Command-line front end for checking storefront forms and failure handling.

mod presets;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use serde_json::Value;
use serde_json::json;
use simplelog::ColorChoice;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use storefront_lib::error::ErrorClassification;
use storefront_lib::error::FailureOutcome;
use storefront_lib::error::FailurePayload;
use storefront_lib::error::ValidatorDefect;
use storefront_lib::validation::FormValidator;

use crate::presets::Preset;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront form validation and failure classification")]
struct Cli {
    #[arg(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a JSON object of form values against a preset.
    Validate {
        #[arg(long, value_enum)]
        preset: Preset,
        values: PathBuf,
    },
    /// Classify a failed request and print the recovery hint.
    Classify {
        #[arg(long)]
        status: Option<u16>,
        #[arg(long, default_value_t = false)]
        transport_failed: bool,
        #[arg(long)]
        message: Option<String>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid form values: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("form values must be a JSON object")]
    NotAnObject,
    #[error(transparent)]
    Validator(#[from] ValidatorDefect),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logger: {}", e);
    }
}

async fn validate(preset: Preset, path: PathBuf) -> Result<bool, CliError> {
    let raw = fs::read_to_string(&path).map_err(|source| CliError::Read {
        path: path.clone(),
        source,
    })?;
    let values = match serde_json::from_str::<Value>(&raw)? {
        Value::Object(values) => values,
        _ => return Err(CliError::NotAnObject),
    };

    log::info!("validating {} against {:?}", path.display(), preset);
    let errors = FormValidator::evaluate(&values, &preset.rules()).await?;
    println!("{}", serde_json::to_string_pretty(&errors)?);
    Ok(errors.is_valid())
}

fn classify(status: Option<u16>, transport_failed: bool, message: Option<String>) -> Value {
    let mut outcome = FailureOutcome {
        transport_failed,
        http_status: status,
        payload: None,
    };
    if let Some(message) = message {
        outcome = outcome.with_payload(FailurePayload::message(message));
    }

    let classification = ErrorClassification::classify(&outcome);
    let suggestion = classification.recovery_suggestion();
    log::debug!("classified {:?} as {}", outcome, classification);

    json!({
        "classification": classification.as_str(),
        "retryable": classification.is_retryable(),
        "suggestion": suggestion,
        "hint": suggestion.hint(),
        "message": outcome.message(),
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Validate { preset, values } => match validate(preset, values).await {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::from(1),
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(2)
            }
        },
        Command::Classify {
            status,
            transport_failed,
            message,
        } => {
            let report = classify(status, transport_failed, message);
            println!("{:#}", report);
            ExitCode::SUCCESS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_validate() {
        let cli = Cli::try_parse_from([
            "storefront",
            "-vv",
            "validate",
            "--preset",
            "sms-login",
            "form.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Validate { preset, values } => {
                assert_eq!(preset, Preset::SmsLogin);
                assert_eq!(values, PathBuf::from("form.json"));
            }
            Command::Classify { .. } => panic!("expected validate"),
        }
    }

    #[test]
    fn test_classify_report() {
        let report = classify(Some(401), false, None);
        assert_eq!(report["classification"], "auth");
        assert_eq!(report["retryable"], false);

        assert_eq!(report["suggestion"], "relogin");

        let report = classify(None, true, Some("timeout".into()));
        assert_eq!(report["classification"], "network");
        assert_eq!(report["retryable"], true);
        assert_eq!(report["message"], "timeout");

        // A status that arrived outranks the transport flag.
        let report = classify(Some(404), true, None);
        assert_eq!(report["classification"], "not_found");
        assert!(report["hint"].is_null());
    }
}
