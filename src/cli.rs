//! Command-line interface definitions.

use std::path::PathBuf;

use clap::Parser;

/// AWS MFA session credential refresher.
///
/// Exchanges an MFA token code for temporary session credentials via STS
/// `GetSessionToken` and writes them into a named profile of the AWS shared
/// credentials file. The MFA device ARN and target profile name are read from
/// a local environment file.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Args {
    /// MFA token code from your authenticator (prompted if omitted)
    #[arg(short, long)]
    pub token_code: Option<String>,

    /// Path to the environment file holding AWS_MFA_ARN and CONFIG_NAME
    #[arg(short, long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Path to AWS credentials file [default: ~/.aws/credentials]
    #[arg(short, long, env = "AWS_SHARED_CREDENTIALS_FILE")]
    pub credentials_path: Option<PathBuf>,

    /// Session duration in seconds (900-129600)
    #[arg(short, long, default_value = "129600")]
    pub duration: u32,
}
