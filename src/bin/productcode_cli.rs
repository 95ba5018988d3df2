//! Product Code CLI - JSON bridge
//!
//! Commands: identify, encode, formats
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on an invalid code

use clap::{Parser, Subcommand};
use serde_json::json;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use productcode_core::{
    identify, DispatchConfig, FormatTag, ProductCode, ENGINE_VERSION,
};

#[derive(Parser)]
#[command(name = "productcode-cli")]
#[command(about = "Product Code CLI - ISBN, ISMN, UPC and EAN-13 bar patterns")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported formats
    Formats,

    /// Identify a code by trying ISBN-13, ISBN-10, ISMN and EAN-13
    Identify {
        /// Code string; `*` marks the unknown check digit
        code: String,

        /// JSON payload (DispatchConfig)
        #[arg(short, long)]
        options: Option<String>,

        /// Keep ISBN-10 codes in their 10-digit form
        #[arg(long)]
        no_isbn13: bool,

        /// Convert ISMN codes to ISMN-13
        #[arg(long)]
        ismn13: bool,
    },

    /// Build a code as one specific format
    Encode {
        /// Format tag, e.g. isbn10, ean13, upc-a
        #[arg(short, long)]
        format: FormatTag,

        code: String,
    },
}

fn code_json(code: &ProductCode) -> serde_json::Value {
    let mut value = json!({
        "valid": true,
        "display": code.to_string(),
        "code": code,
    });
    if let Ok(ean) = code.as_ean13() {
        if ean.format() != code.format() {
            value["ean13"] = json!({
                "display": ean.to_string(),
                "code": ean,
            });
        }
    }
    value
}

fn print_result(result: Result<ProductCode, productcode_core::CodeError>) -> ExitCode {
    match result {
        Ok(code) => {
            println!("{}", serde_json::to_string_pretty(&code_json(&code)).unwrap_or_default());
            ExitCode::SUCCESS
        }
        Err(e) => {
            let output = json!({
                "valid": false,
                "error": e.to_string(),
            });
            println!("{}", output);
            ExitCode::from(2)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Formats => {
            let formats: Vec<_> = FormatTag::ALL
                .iter()
                .map(|tag| {
                    let config = tag.config();
                    json!({
                        "format": tag,
                        "label": config.label,
                        "modulus": config.modulus,
                        "weights": config.weights,
                    })
                })
                .collect();

            let output = json!({
                "engine_version": ENGINE_VERSION,
                "formats": formats,
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
            ExitCode::SUCCESS
        }

        Commands::Identify { code, options, no_isbn13, ismn13 } => {
            let mut config: DispatchConfig = match options.as_deref() {
                Some(payload) => match serde_json::from_str(payload) {
                    Ok(c) => c,
                    Err(e) => {
                        println!("{}", json!({ "valid": false, "error": format!("Invalid payload: {}", e) }));
                        return ExitCode::FAILURE;
                    }
                },
                None => DispatchConfig::default(),
            };

            if no_isbn13 {
                config.normalize_isbn = false;
            }
            if ismn13 {
                config.normalize_ismn = true;
            }
            debug!(?config, "dispatch options");

            print_result(identify(&code, &config))
        }

        Commands::Encode { format, code } => print_result(ProductCode::new(format, &code)),
    }
}
