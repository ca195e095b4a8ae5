//! Strongly-typed, prefixed identifiers.
//!
//! All IDs are opaque newtypes over `String`. Callers never parse or
//! construct the internal representation; minted IDs always carry a fixed
//! prefix (`sub_`, `evt_`, `rt_`) so a stray ID can be traced to its kind
//! from its text alone.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Macro to define a prefixed ID newtype wrapper.
///
/// Generates: struct, `new()` (prefix + 16 hex chars from a UUIDv4),
/// `from_string()`, `as_str()`, `Display`, `Serialize`, `Deserialize`.
macro_rules! define_prefixed_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Mint a fresh identifier: `<prefix><16 lowercase hex chars>`.
            pub fn new() -> Self {
                let hex = uuid::Uuid::new_v4().simple().to_string();
                Self(format!("{}{}", $prefix, &hex[..16]))
            }

            pub fn from_string(s: String) -> Result<Self, &'static str> {
                if s.is_empty() {
                    return Err(concat!(stringify!($name), " cannot be empty"));
                }
                Ok(Self(s))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_prefixed_id!(SubmissionId, "sub_");
define_prefixed_id!(EventId, "evt_");

/// Resume token: `rt_` + URL-safe base64 of 32 cryptographically random bytes.
///
/// Unlike [`SubmissionId`]/[`EventId`], entropy comes straight from the OS
/// CSPRNG via `getrandom` (full 256 bits) rather than being merely unique —
/// resume tokens must be unguessable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResumeToken(String);

impl ResumeToken {
    pub fn new() -> Self {
        let mut bytes = [0u8; 32];
        getrandom::getrandom(&mut bytes).expect("OS CSPRNG unavailable");
        let encoded = base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, bytes);
        Self(format!("rt_{encoded}"))
    }

    pub fn from_string(s: String) -> Result<Self, &'static str> {
        if s.is_empty() {
            return Err("ResumeToken cannot be empty");
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ResumeToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResumeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_id_has_prefix_and_fixed_width() {
        let id = SubmissionId::new();
        assert!(id.as_str().starts_with("sub_"));
        assert_eq!(id.as_str().len(), "sub_".len() + 16);
    }

    #[test]
    fn event_id_has_prefix_and_fixed_width() {
        let id = EventId::new();
        assert!(id.as_str().starts_with("evt_"));
        assert_eq!(id.as_str().len(), "evt_".len() + 16);
    }

    #[test]
    fn ids_are_unique() {
        let a = SubmissionId::new();
        let b = SubmissionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn resume_token_has_prefix_and_sufficient_entropy() {
        let token = ResumeToken::new();
        assert!(token.as_str().starts_with("rt_"));
        // 32 random bytes, base64url-no-pad encoded, is at least 43 chars.
        assert!(token.as_str().len() >= "rt_".len() + 43);
    }

    #[test]
    fn resume_tokens_are_unique() {
        let a = ResumeToken::new();
        let b = ResumeToken::new();
        assert_ne!(a, b);
    }

    #[test]
    fn from_string_rejects_empty() {
        assert!(SubmissionId::from_string(String::new()).is_err());
        assert!(ResumeToken::from_string(String::new()).is_err());
    }

    #[test]
    fn display_matches_as_str() {
        let id = SubmissionId::new();
        assert_eq!(format!("{id}"), id.as_str());
    }
}
