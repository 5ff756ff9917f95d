//! AWS MFA session credential refresher.
//!
//! One linear run per invocation:
//! 1. Load `AWS_MFA_ARN` and `CONFIG_NAME` from a local environment file
//! 2. Take the MFA token code from `--token-code` or an interactive prompt
//! 3. Exchange the code for temporary session credentials via STS
//!    `GetSessionToken`
//! 4. Write the access key id, secret access key and session token into the
//!    configured profile of the AWS shared credentials file
//!
//! Any failure aborts the run with a non-zero exit; nothing is retried and no
//! partial credentials are ever written.

use std::io::Write;

use anyhow::Result;
use aws_smithy_types::date_time::Format;
use clap::Parser;
use log::info;

mod cli;
mod error;
mod profile;
mod settings;
mod sts;

use cli::Args;
use error::Error;
use profile::CredentialsFile;
use settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Info-level by default; RUST_LOG overrides.
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let Args {
        token_code,
        env_file,
        credentials_path,
        duration,
    } = Args::parse();

    let settings = Settings::load(&env_file)?;
    sts::validate_duration(duration)?;
    let credentials_file = CredentialsFile::new(credentials_path)?;

    let token_code = match token_code {
        Some(code) => code,
        None => prompt_token_code(&settings.mfa_serial)?,
    };
    if token_code.is_empty() {
        return Err(Error::Config("MFA token code is empty".into()).into());
    }

    let creds = sts::get_session_token(&settings.mfa_serial, &token_code, duration).await?;
    credentials_file.write_profile(&settings.profile, &creds)?;

    let expiration = creds
        .expiration
        .fmt(Format::DateTime)
        .unwrap_or_else(|_| "unknown".to_string());
    info!(
        "Success! Profile [{}] is valid until {expiration}",
        settings.profile
    );
    Ok(())
}

/// Reads the MFA token code from stdin.
fn prompt_token_code(mfa_serial: &str) -> Result<String, Error> {
    let io_err = |e: std::io::Error| Error::Config(format!("failed to read token code: {e}"));

    print!("Enter MFA token code for {mfa_serial}: ");
    std::io::stdout().flush().map_err(io_err)?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input).map_err(io_err)?;
    Ok(input.trim().to_string())
}
