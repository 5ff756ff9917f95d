//! STS `GetSessionToken` exchange.

use std::time::Duration;

use aws_config::timeout::TimeoutConfig;
use aws_sdk_sts::{Client, error::DisplayErrorContext};
use aws_smithy_types::DateTime;
use log::info;

use crate::error::{Error, Result};

/// STS lower bound for `DurationSeconds` (15 minutes).
pub const MIN_DURATION_SECS: u32 = 900;
/// STS upper bound for `DurationSeconds` (36 hours).
pub const MAX_DURATION_SECS: u32 = 129_600;

/// Bound on the whole exchange so a stalled connection cannot hang the run.
const OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Temporary credentials returned by a successful exchange.
///
/// Produced once per run and handed straight to the credentials-file writer;
/// never cached or reused across runs.
#[derive(Debug, Clone)]
pub struct SessionCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime,
}

/// Rejects durations outside the STS-accepted range before any network I/O.
pub fn validate_duration(duration: u32) -> Result<()> {
    if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&duration) {
        return Err(Error::Config(format!(
            "session duration {duration}s is outside {MIN_DURATION_SECS}-{MAX_DURATION_SECS}s"
        )));
    }
    Ok(())
}

/// Exchanges an MFA token code for temporary session credentials.
///
/// Issues exactly one `GetSessionToken` call using the ambient AWS credential
/// chain. Service rejections (wrong or expired code, unknown MFA serial) map
/// to [`Error::Auth`]; connect failures and timeouts map to
/// [`Error::Transport`]. Nothing is retried.
pub async fn get_session_token(
    mfa_serial: &str,
    token_code: &str,
    duration: u32,
) -> Result<SessionCredentials> {
    validate_duration(duration)?;

    info!("Requesting session token - Duration: {duration}s");

    let config = aws_config::from_env()
        .timeout_config(
            TimeoutConfig::builder()
                .operation_timeout(OPERATION_TIMEOUT)
                .build(),
        )
        .load()
        .await;

    let output = Client::new(&config)
        .get_session_token()
        .duration_seconds(duration as i32)
        .serial_number(mfa_serial)
        .token_code(token_code)
        .send()
        .await
        .map_err(|err| match err.as_service_error() {
            Some(service_err) => Error::Auth(service_err.to_string()),
            None => Error::Transport(DisplayErrorContext(&err).to_string()),
        })?;

    let creds = output
        .credentials()
        .ok_or_else(|| Error::Transport("STS returned no credentials".into()))?;

    Ok(SessionCredentials {
        access_key_id: creds.access_key_id().to_string(),
        secret_access_key: creds.secret_access_key().to_string(),
        session_token: creds.session_token().to_string(),
        expiration: *creds.expiration(),
    })
}
