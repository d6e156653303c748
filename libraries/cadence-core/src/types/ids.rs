/// ID types for Cadence entities
use serde::{Deserialize, Serialize};
use std::fmt;

/// Track identifier
///
/// Integer key assigned by the catalog. The player only ever compares ids,
/// it never allocates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(i64);

impl TrackId {
    /// Create a track ID from its catalog key
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner integer
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for TrackId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_bare_integer() {
        let id = TrackId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");

        let parsed: TrackId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, TrackId::new(7));
    }

    #[test]
    fn display_matches_inner_value() {
        assert_eq!(TrackId::from(-3).to_string(), "-3");
    }
}
