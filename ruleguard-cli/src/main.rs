//! RuleGuard CLI: validate rule trees, indicator sets, and built-in templates.
//!
//! Commands:
//! - `validate`: validate a rule or bare condition group from a JSON file
//! - `indicators`: validate a JSON array of indicator configurations
//! - `templates`: list the built-in templates, optionally validating each
//! - `config`: print the effective validator configuration (defaults or `--config`) as TOML
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `ruleguard_core=info`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ruleguard_core::domain::{builtin_templates, IndicatorConfig, Rule, RuleGroup};
use ruleguard_core::{RuleValidator, ValidationResult, ValidatorConfig};

#[derive(Parser)]
#[command(
    name = "ruleguard",
    about = "RuleGuard CLI: trading rule and indicator validation"
)]
struct Cli {
    /// Path to a TOML validator config. Defaults to built-in thresholds.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a rule (or a bare condition group) from a JSON file.
    Validate {
        /// JSON file holding a rule or a root group.
        file: PathBuf,
    },
    /// Validate a JSON array of indicator configurations.
    Indicators {
        file: PathBuf,
    },
    /// List built-in templates.
    Templates {
        /// Also validate each template and print the verdict.
        #[arg(long, default_value_t = false)]
        validate: bool,
    },
    /// Print the effective validator config (defaults or `--config`) as TOML.
    Config,
}

#[derive(Serialize)]
struct Report<'a> {
    subject: &'a str,
    #[serde(flatten)]
    validation: &'a ValidationResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    suggestions: Vec<String>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ValidatorConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ValidatorConfig::default(),
    };
    let validator = RuleValidator::new(config);

    let ok = match cli.command {
        Commands::Validate { file } => run_validate(&validator, &file)?,
        Commands::Indicators { file } => run_indicators(&validator, &file)?,
        Commands::Templates { validate } => run_templates(&validator, validate)?,
        Commands::Config => {
            print!("{}", config_toml(&validator)?);
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ruleguard_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing JSON in {}", path.display()))
}

fn print_report(report: &Report<'_>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Returns whether the input was valid.
fn run_validate(validator: &RuleValidator, file: &Path) -> Result<bool> {
    let json = read_json(file)?;

    // A rule carries its tree under `root_group`; anything else is a bare group.
    let (subject, validation, group) = if json.get("root_group").is_some() {
        let rule: Rule = serde_json::from_value(json).context("decoding rule")?;
        let validation = validator.validate_rule(&rule);
        (format!("rule {}", rule.id), validation, rule.root_group)
    } else {
        let group: RuleGroup = serde_json::from_value(json).context("decoding condition group")?;
        let validation = validator.validate_group(&group);
        (format!("group {}", group.id), validation, group)
    };
    debug!(%subject, "validated input file");

    let suggestions = if validation.valid {
        validator.suggest(&group)
    } else {
        Vec::new()
    };
    print_report(&Report {
        subject: &subject,
        validation: &validation,
        suggestions,
    })?;
    Ok(validation.valid)
}

fn run_indicators(validator: &RuleValidator, file: &Path) -> Result<bool> {
    let json = read_json(file)?;
    let configs: Vec<IndicatorConfig> =
        serde_json::from_value(json).context("decoding indicator list")?;
    let validation = validator.validate_indicators(&configs);
    let subject = format!("{} indicator(s)", configs.len());
    print_report(&Report {
        subject: &subject,
        validation: &validation,
        suggestions: Vec::new(),
    })?;
    Ok(validation.valid)
}

fn config_toml(validator: &RuleValidator) -> Result<String> {
    Ok(validator.config().to_toml()?)
}

fn run_templates(validator: &RuleValidator, validate: bool) -> Result<bool> {
    let mut all_valid = true;
    for template in builtin_templates() {
        println!(
            "{:<24} {:<28} {:?}  popularity {:>3}  win rate {:.0}%",
            template.id,
            template.name,
            template.category,
            template.popularity,
            template.avg_win_rate * 100.0
        );
        if validate {
            let review = validator.review(&template.root_group);
            if review.validation.valid {
                println!("    valid ({} warning(s))", review.validation.warnings.len());
            } else {
                all_valid = false;
                for msg in review.validation.errors.iter().chain(&review.validation.conflicts) {
                    println!("    {msg}");
                }
            }
            for suggestion in &review.suggestions {
                println!("    hint: {suggestion}");
            }
        }
    }
    Ok(all_valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_command_prints_loaded_thresholds() {
        let loaded = ValidatorConfig {
            max_nesting: 5,
            ..ValidatorConfig::default()
        };
        let printed = config_toml(&RuleValidator::new(loaded.clone())).unwrap();
        assert_eq!(ValidatorConfig::from_toml(&printed).unwrap(), loaded);
        assert_ne!(printed, ValidatorConfig::default().to_toml().unwrap());
    }
}
