use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a member of an expense group.
///
/// The id carries no meaning beyond identity and ordering. Ordering is used
/// as the deterministic tie-break whenever two members hold equal balances.
///
/// # Examples
///
/// ```
/// use expense_settler::core::member::MemberId;
///
/// let alice = MemberId::new("alice");
/// let bob = MemberId::new("bob");
/// assert_ne!(alice, bob);
/// assert!(alice < bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this member id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for MemberId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_equality() {
        let a = MemberId::new("alice");
        let b = MemberId::from("alice");
        let c = MemberId::new("carol");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_member_display() {
        let m = MemberId::new("dave");
        assert_eq!(format!("{}", m), "dave");
    }

    #[test]
    fn test_member_serializes_as_plain_string() {
        let json = serde_json::to_string(&MemberId::new("erin")).unwrap();
        assert_eq!(json, "\"erin\"");
    }
}
