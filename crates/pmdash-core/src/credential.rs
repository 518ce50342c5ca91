//! Bearer credential obtained from the wallet challenge/response handshake.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Opaque bearer token attached to mutating backend calls.
///
/// The token is the only durable client-side state; it is zeroized on drop
/// and never logged in full.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    token: String,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value() {
        let cred = Credential::new("t1");
        assert_eq!(cred.header_value(), "Bearer t1");
    }

    #[test]
    fn test_debug_redacts_token() {
        let cred = Credential::new("secret-token");
        let printed = format!("{cred:?}");
        assert!(!printed.contains("secret-token"));
    }

    #[test]
    fn test_serde_round_trip() {
        let cred = Credential::new("t1");
        let json = serde_json::to_string(&cred).unwrap();
        assert_eq!(json, r#"{"token":"t1"}"#);
        let back: Credential = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cred);
    }
}
