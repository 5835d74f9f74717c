//! Basic type definitions for the chat server
//!
//! Provides newtype wrappers for type safety:
//! - `ConnId`: UUID-based connection identifier (exists before a nickname does)
//! - `Nickname`: validated, case-sensitive user identifier
//! - `GroupName`: free-form group identifier

use uuid::Uuid;

/// Unique connection identifier (newtype pattern)
///
/// Wraps a UUID v4 so a connection can be traced in logs before (and
/// independently of) nickname negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(pub Uuid);

impl ConnId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated nickname: one or more letters, digits, or underscores.
///
/// Case-sensitive; uniqueness is enforced by the session registry, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nickname(String);

impl Nickname {
    /// Validate a candidate nickname.
    ///
    /// Returns `None` if the candidate is empty or contains anything other
    /// than letters, digits, or underscores. Letters and digits are Unicode,
    /// not just ASCII.
    pub fn parse(candidate: &str) -> Option<Self> {
        if candidate.is_empty() {
            return None;
        }
        if candidate.chars().all(|c| c.is_alphanumeric() || c == '_') {
            Some(Self(candidate.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Nickname {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Group name: any single whitespace-free token, case-sensitive.
///
/// The command parser only ever produces whole whitespace-split tokens, so a
/// `GroupName` can never contain whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupName(String);

impl GroupName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conn_id_unique() {
        let id1 = ConnId::new();
        let id2 = ConnId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_nickname_accepts_alphanumeric_and_underscore() {
        assert!(Nickname::parse("alice").is_some());
        assert!(Nickname::parse("Alice_99").is_some());
        assert!(Nickname::parse("_").is_some());
    }

    #[test]
    fn test_nickname_accepts_unicode_letters() {
        assert!(Nickname::parse("héllo").is_some());
        assert!(Nickname::parse("日本語").is_some());
        assert!(Nickname::parse("désiré_2").is_some());
    }

    #[test]
    fn test_nickname_rejects_empty_and_symbols() {
        assert!(Nickname::parse("").is_none());
        assert!(Nickname::parse("bad name").is_none());
        assert!(Nickname::parse("no-dashes").is_none());
        assert!(Nickname::parse("nope!").is_none());
    }

    #[test]
    fn test_nickname_case_sensitive() {
        let a = Nickname::parse("Carol").unwrap();
        let b = Nickname::parse("carol").unwrap();
        assert_ne!(a, b);
    }
}
