//! Shared credentials file writer.
//!
//! Persists a session credential triple into one named section of the AWS
//! shared credentials file (`~/.aws/credentials` by default), leaving every
//! other section and key as it was. The section is created if it does not
//! exist yet. The file is replaced atomically: the full content is rendered
//! into a temp file in the same directory and renamed over the original, so
//! an interrupted run never leaves a truncated file behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use log::info;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::sts::SessionCredentials;

const ACCESS_KEY_ID: &str = "aws_access_key_id";
const SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
const SESSION_TOKEN: &str = "aws_session_token";

// configparser writes its implicit default section headerless, which would
// strip the `[default]` header from a real profile of that name. Point it at
// a name no profile can collide with so `default` round-trips intact.
const HEADERLESS_SECTION: &str = "~headerless~";

/// Case-sensitive parser so section names round-trip unchanged, with the
/// implicit default section moved out of the way of the `default` profile.
fn parser() -> Ini {
    let mut ini = Ini::new_cs();
    ini.set_default_section(HEADERLESS_SECTION);
    ini
}

pub struct CredentialsFile {
    path: PathBuf,
}

impl CredentialsFile {
    /// Resolves the credentials file location, defaulting to
    /// `~/.aws/credentials` when no explicit path is given.
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let path = path
            .or_else(|| dirs::home_dir().map(|d| d.join(".aws").join("credentials")))
            .ok_or_else(|| Error::Config("could not determine home directory".into()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the triple into `profile`, preserving everything else.
    ///
    /// A missing file is treated as empty. On any error the original file is
    /// left exactly as it was found.
    pub fn write_profile(&self, profile: &str, creds: &SessionCredentials) -> Result<()> {
        let mut ini = parser();
        if self.path.exists() {
            ini.load(&self.path).map_err(|e| {
                Error::Persistence(format!("failed to load {}: {e}", self.path.display()))
            })?;
        }

        if ini.sections().iter().any(|s| s == profile) {
            info!("Overwriting existing profile [{profile}]");
        } else {
            info!("Creating profile [{profile}]");
        }

        ini.set(profile, ACCESS_KEY_ID, Some(creds.access_key_id.clone()));
        ini.set(
            profile,
            SECRET_ACCESS_KEY,
            Some(creds.secret_access_key.clone()),
        );
        ini.set(profile, SESSION_TOKEN, Some(creds.session_token.clone()));

        self.replace_with(&ini.writes())?;
        info!("Wrote session credentials to {}", self.path.display());
        Ok(())
    }

    fn replace_with(&self, content: &str) -> Result<()> {
        let io_err =
            |e: std::io::Error| Error::Persistence(format!("{}: {e}", self.path.display()));

        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::Persistence(format!("{} has no parent", self.path.display())))?;
        std::fs::create_dir_all(parent).map_err(io_err)?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(io_err)?;
        tmp.write_all(content.as_bytes()).map_err(io_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(io_err)?;
        }

        tmp.persist(&self.path)
            .map_err(|e| Error::Persistence(format!("{}: {}", self.path.display(), e.error)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use aws_smithy_types::DateTime;
    use tempfile::tempdir;

    use super::*;

    fn triple() -> SessionCredentials {
        SessionCredentials {
            access_key_id: "ASIAEXAMPLE".into(),
            secret_access_key: "secretEXAMPLE".into(),
            session_token: "tokenEXAMPLE".into(),
            expiration: DateTime::from_secs(1_700_000_000),
        }
    }

    fn load(path: &Path) -> Ini {
        let mut ini = parser();
        ini.load(path).unwrap();
        ini
    }

    #[test]
    fn creates_file_and_section() {
        let dir = tempdir().unwrap();
        let file = CredentialsFile::new(Some(dir.path().join("credentials"))).unwrap();

        file.write_profile("work", &triple()).unwrap();

        let ini = load(file.path());
        assert_eq!(ini.get("work", ACCESS_KEY_ID).unwrap(), "ASIAEXAMPLE");
        assert_eq!(ini.get("work", SECRET_ACCESS_KEY).unwrap(), "secretEXAMPLE");
        assert_eq!(ini.get("work", SESSION_TOKEN).unwrap(), "tokenEXAMPLE");
    }

    #[test]
    fn preserves_other_sections_and_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials");
        fs::write(
            &path,
            "[default]\naws_access_key_id=AKIADEFAULT\naws_secret_access_key=defaultsecret\n\
             [work]\nregion=eu-west-1\n",
        )
        .unwrap();

        let file = CredentialsFile::new(Some(path)).unwrap();
        file.write_profile("work", &triple()).unwrap();

        let ini = load(file.path());
        assert_eq!(ini.get("default", ACCESS_KEY_ID).unwrap(), "AKIADEFAULT");
        assert_eq!(
            ini.get("default", SECRET_ACCESS_KEY).unwrap(),
            "defaultsecret"
        );
        // Unrelated key inside the target section survives too.
        assert_eq!(ini.get("work", "region").unwrap(), "eu-west-1");
        assert_eq!(ini.get("work", SESSION_TOKEN).unwrap(), "tokenEXAMPLE");

        // Assert on the raw text as well: a parser would also resolve keys
        // that lost their section header, hiding a mangled file.
        let content = fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("[default]"));
        assert!(content.contains("[work]"));
        assert!(!content.starts_with("aws_access_key_id"));
    }

    #[test]
    fn default_section_header_survives_rewrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials");
        fs::write(
            &path,
            "[default]\naws_access_key_id=AKIADEFAULT\naws_secret_access_key=defaultsecret\n\
             [work]\nregion=eu-west-1\n",
        )
        .unwrap();

        let file = CredentialsFile::new(Some(path)).unwrap();
        file.write_profile("work", &triple()).unwrap();

        let content = fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("[default]"));
        assert!(content.contains("[work]"));
    }

    #[test]
    fn default_can_be_the_target_profile() {
        let dir = tempdir().unwrap();
        let file = CredentialsFile::new(Some(dir.path().join("credentials"))).unwrap();

        file.write_profile("default", &triple()).unwrap();

        let content = fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("[default]"));
        let ini = load(file.path());
        assert_eq!(ini.get("default", SESSION_TOKEN).unwrap(), "tokenEXAMPLE");
    }

    #[cfg(unix)]
    #[test]
    fn failed_write_leaves_file_untouched() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials");
        fs::write(&path, "[default]\naws_access_key_id=AKIADEFAULT\n").unwrap();
        let before = fs::read(&path).unwrap();

        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o555)).unwrap();
        // Privileged users bypass mode bits; nothing to exercise in that case.
        if fs::write(dir.path().join("writable-check"), b"").is_ok() {
            fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let file = CredentialsFile::new(Some(path.clone())).unwrap();
        let err = file.write_profile("work", &triple()).unwrap_err();
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(err, Error::Persistence(_)));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn writing_twice_is_idempotent() {
        let dir = tempdir().unwrap();
        let file = CredentialsFile::new(Some(dir.path().join("credentials"))).unwrap();

        file.write_profile("work", &triple()).unwrap();
        let first = fs::read(file.path()).unwrap();
        file.write_profile("work", &triple()).unwrap();
        let second = fs::read(file.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn section_case_is_preserved() {
        let dir = tempdir().unwrap();
        let file = CredentialsFile::new(Some(dir.path().join("credentials"))).unwrap();

        file.write_profile("Work", &triple()).unwrap();

        let content = fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("[Work]"));
        let ini = load(file.path());
        assert!(ini.get("work", ACCESS_KEY_ID).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn file_mode_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let file = CredentialsFile::new(Some(dir.path().join("credentials"))).unwrap();
        file.write_profile("work", &triple()).unwrap();

        let mode = fs::metadata(file.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
