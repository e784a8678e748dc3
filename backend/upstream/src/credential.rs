//! # Credential
//!
//! Bearer token for the evaluation service, obtained out of band and stored
//! on disk as `{ "access_token": "..." }`.
//!
//! The file is read once at startup. Whether a missing token is fatal is up
//! to the caller, see [`resolve_credential`].
use std::{fmt, fs::read_to_string, path::Path};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::CredentialError;

#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn bearer(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Deserialize)]
struct TokenFile {
    access_token: Option<String>,
}

pub fn load_credential(path: &Path) -> Result<Credential, CredentialError> {
    let data = read_to_string(path).map_err(|source| CredentialError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let token_file: TokenFile =
        serde_json::from_str(&data).map_err(|e| CredentialError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    match token_file.access_token.map(|t| t.trim().to_string()) {
        Some(token) if !token.is_empty() => Ok(Credential(token)),
        _ => Err(CredentialError::Malformed {
            path: path.to_path_buf(),
            reason: "access_token missing or empty".to_string(),
        }),
    }
}

/// Loads the credential, degrading to `None` unless `required` is set.
///
/// Without a credential every upstream call goes out unauthenticated and is
/// expected to be rejected there.
pub fn resolve_credential(
    path: &Path,
    required: bool,
) -> Result<Option<Credential>, CredentialError> {
    match load_credential(path) {
        Ok(credential) => {
            info!("Loaded access token from {}", path.display());
            Ok(Some(credential))
        }
        Err(e) if required => Err(e),
        Err(e) => {
            warn!("{e}, continuing without access token");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn token_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid() {
        let file = token_file(r#"{"access_token": "abc.def", "token_type": "Bearer"}"#);

        let credential = load_credential(file.path()).unwrap();
        assert_eq!(credential.bearer(), "abc.def");
    }

    #[test]
    fn test_debug_redacts() {
        let credential = Credential::new("secret");
        assert_eq!(format!("{credential:?}"), "Credential(***)");
    }

    #[test]
    fn test_missing_field() {
        let file = token_file(r#"{"token_type": "Bearer"}"#);

        assert!(matches!(
            load_credential(file.path()),
            Err(CredentialError::Malformed { .. })
        ));
    }

    #[test]
    fn test_empty_token() {
        let file = token_file(r#"{"access_token": "   "}"#);

        assert!(matches!(
            load_credential(file.path()),
            Err(CredentialError::Malformed { .. })
        ));
    }

    #[test]
    fn test_not_json() {
        let file = token_file("access_token=abc");

        assert!(matches!(
            load_credential(file.path()),
            Err(CredentialError::Malformed { .. })
        ));
    }

    #[test]
    fn test_absent_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth_token.json");

        assert_eq!(resolve_credential(&path, false).unwrap(), None);
    }

    #[test]
    fn test_absent_required() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth_token.json");

        assert!(matches!(
            resolve_credential(&path, true),
            Err(CredentialError::Read { .. })
        ));
    }
}
