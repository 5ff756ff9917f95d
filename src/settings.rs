//! Local environment file loading.
//!
//! The refresher is configured by a two-key `.env` file next to the binary
//! (or wherever `--env-file` points):
//!
//! ```ini
//! AWS_MFA_ARN=arn:aws:iam::123456789012:mfa/alice
//! CONFIG_NAME=work
//! ```
//!
//! Both keys are required. The file is parsed without touching the process
//! environment, and the result is an immutable value passed explicitly to the
//! STS and credentials-file components.

use std::path::Path;

use crate::error::{Error, Result};

const MFA_ARN_KEY: &str = "AWS_MFA_ARN";
const CONFIG_NAME_KEY: &str = "CONFIG_NAME";

/// Invocation configuration loaded once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// ARN of the operator's MFA device, e.g. `arn:aws:iam::ACCOUNT:mfa/NAME`.
    pub mfa_serial: String,
    /// Credentials-file section the session credentials are written to.
    pub profile: String,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let entries = dotenvy::from_path_iter(path).map_err(|e| {
            Error::Config(format!(
                "failed to read environment file {}: {e}",
                path.display()
            ))
        })?;

        let mut mfa_serial = None;
        let mut profile = None;
        for entry in entries {
            let (key, value) =
                entry.map_err(|e| Error::Config(format!("malformed environment file: {e}")))?;
            match key.as_str() {
                MFA_ARN_KEY => mfa_serial = Some(value),
                CONFIG_NAME_KEY => profile = Some(value),
                _ => {}
            }
        }

        Ok(Self {
            mfa_serial: required(MFA_ARN_KEY, mfa_serial)?,
            profile: required(CONFIG_NAME_KEY, profile)?,
        })
    }
}

fn required(key: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(Error::Config(format!("{key} is empty"))),
        None => Err(Error::Config(format!("missing {key}"))),
    }
}
