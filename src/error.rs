//! Failure kinds for a refresh run, one variant per pipeline stage.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Bad or missing local configuration, detected before any network call.
    #[error("configuration error: {0}")]
    Config(String),

    /// STS rejected the exchange (invalid/expired token code, bad MFA serial).
    #[error("STS rejected the session token request: {0}")]
    Auth(String),

    /// STS could not be reached (connect failure, timeout, service outage).
    #[error("could not reach STS: {0}")]
    Transport(String),

    /// The credentials file could not be read, parsed, or replaced.
    #[error("credentials file error: {0}")]
    Persistence(String),
}
