//! bcrypt command-line tool.
//!
//! Hashes a password typed at the terminal, or checks one against an existing
//! hash string.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use bcrypt_core::{Bcrypt, Salt, DEFAULT_COST};
use clap::{Parser, Subcommand};
use rpassword::read_password;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use unicode_normalization::UnicodeNormalization;

// =============================================================================
// CLI DEFINITION
// =============================================================================

#[derive(Parser)]
#[command(name = "bcrypt-core")]
#[command(about = "bcrypt password hashing", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// NFKC-normalize the password before hashing, so that visually equal
    /// Unicode input hashes the same
    #[arg(long, global = true)]
    nfkc: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a password and print the full hash string
    Hash {
        /// Work factor (4-31)
        #[arg(short, long, env = "BCRYPT_COST", default_value_t = DEFAULT_COST)]
        cost: u32,

        /// Encoded 22-character salt; random if omitted
        #[arg(short, long)]
        salt: Option<String>,
    },
    /// Check a password against a hash string
    Verify {
        /// Hash string, e.g. $2b$10$...
        #[arg(value_name = "HASH")]
        hash: String,
    },
}

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Hash { cost, salt } => {
            let salt = match salt {
                Some(encoded) => encoded
                    .parse::<Salt>()
                    .with_context(|| format!("Invalid salt: {encoded}"))?,
                None => Salt::random(),
            };
            let bcrypt = Bcrypt::new(cost, salt)?;

            let password = prompt("Enter password to hash: ", cli.nfkc)?;
            let hashed = bcrypt.hash(&password)?;
            println!("{hashed}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Verify { hash } => {
            let password = prompt("Enter password to verify: ", cli.nfkc)?;
            let matched = bcrypt_core::verify(&password, &hash)
                .with_context(|| format!("Failed to check against {hash}"))?;

            if matched {
                println!("match");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("mismatch");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

/// Reads a password without echoing it.
fn prompt(message: &str, nfkc: bool) -> Result<String> {
    eprint!("{message}");
    io::stderr().flush()?;
    let password = read_password().context("Failed to read password")?;
    Ok(prepare(password, nfkc))
}

fn prepare(password: String, nfkc: bool) -> String {
    if nfkc {
        debug!("normalizing password to NFKC");
        password.nfkc().collect()
    } else {
        password
    }
}
