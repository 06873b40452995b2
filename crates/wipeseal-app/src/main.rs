// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wipeseal — signed certificates of storage-device erasure.
//
// Entry point. Initialises logging, parses the command line and maps every
// failure to a plain-English message and a non-zero exit status.

mod commands;
mod data_dir;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use wipeseal_core::human_errors::humanize_error;

use commands::{CliError, SealArgs};

/// wipeseal - seal and verify storage-erasure attestations
#[derive(Parser, Debug)]
#[command(name = "wipeseal")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign a wipe record and produce `X-signed.json` plus a signed `X.pdf`
    Seal {
        /// Attestation record produced by the wipe tool
        record: PathBuf,

        /// Final signed certificate path (`X.pdf`)
        #[arg(short, long)]
        output: PathBuf,

        /// Private key PEM (overrides the configuration)
        #[arg(long)]
        key: Option<PathBuf>,

        /// Signer certificate PEM (overrides the configuration)
        #[arg(long)]
        cert: Option<PathBuf>,

        /// `/Reason` entry of the document signature
        #[arg(long)]
        reason: Option<String>,

        /// `/Location` entry of the document signature
        #[arg(long)]
        location: Option<String>,
    },

    /// Check the signature embedded in a signed record
    VerifyRecord {
        /// Signed record (`X-signed.json`)
        record: PathBuf,

        /// Certificate whose public key should have signed it
        #[arg(long)]
        cert: Option<PathBuf>,
    },

    /// Check the signature of a signed certificate PDF
    VerifyDocument {
        /// Signed certificate PDF
        document: PathBuf,
    },

    /// Show byte range, signer and digest details of a signed PDF
    Inspect {
        /// Signed certificate PDF
        document: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(data_dir::default_config_path);

    let result = match cli.command {
        Commands::Seal {
            record,
            output,
            key,
            cert,
            reason,
            location,
        } => commands::seal(
            &config_path,
            &SealArgs {
                record,
                output,
                key,
                cert,
                reason,
                location,
            },
        ),
        Commands::VerifyRecord { record, cert } => {
            commands::verify_record(&config_path, &record, cert.as_deref())
        }
        Commands::VerifyDocument { document } => commands::verify_document(&document),
        Commands::Inspect { document } => commands::inspect(&document),
    };

    match result {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn report_error(err: &CliError) {
    match err {
        CliError::Wipeseal(inner) => print_human(inner),
        CliError::Pipeline(failure) => {
            eprintln!("Sealing stopped while {}.", failure.stage);
            print_human(&failure.error);
        }
        CliError::Invalid(message) => eprintln!("{message}"),
    }
}

fn print_human(err: &wipeseal_core::WipesealError) {
    let human = humanize_error(err);
    eprintln!("Error: {}", human.message);
    eprintln!("  {}", human.suggestion);
    tracing::debug!(error = %err, kind = ?err.kind(), "command failed");
}
