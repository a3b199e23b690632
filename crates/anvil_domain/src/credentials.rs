use std::str::FromStr;

use crate::Error;

/// Static AWS credential pair.
///
/// Parsed from the `ACCESS_KEY:SECRET_KEY` joined form used in provider
/// configuration. The secret may itself contain `:` so only the first colon
/// splits the pair.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    access_key_id: String,
    secret_access_key: String,
}

impl CredentialPair {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }
}

impl FromStr for CredentialPair {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.split_once(':') {
            Some((access, secret)) if !access.is_empty() && !secret.is_empty() => {
                Ok(Self::new(access, secret))
            }
            _ => Err(Error::CredentialFormat),
        }
    }
}

// Keeps the secret out of logs and error chains.
impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parses_joined_pair() {
        let actual = "AKIAEXAMPLE:abc123".parse::<CredentialPair>().unwrap();
        let expected = CredentialPair::new("AKIAEXAMPLE", "abc123");

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_secret_keeps_extra_colons() {
        let actual = "AKIAEXAMPLE:abc:def".parse::<CredentialPair>().unwrap();

        assert_eq!(actual.secret_access_key(), "abc:def");
    }

    #[test]
    fn test_rejects_missing_separator() {
        let actual = "AKIAEXAMPLE".parse::<CredentialPair>();

        assert!(actual.is_err());
    }

    #[test]
    fn test_rejects_empty_sides() {
        assert!(":secret".parse::<CredentialPair>().is_err());
        assert!("access:".parse::<CredentialPair>().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let fixture = CredentialPair::new("AKIAEXAMPLE", "abc123");

        let actual = format!("{fixture:?}");

        assert!(!actual.contains("abc123"));
        assert!(actual.contains("AKIAEXAMPLE"));
    }
}
