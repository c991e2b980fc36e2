use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use data_encoding::HEXLOWER;
use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Number of random bytes behind an [`Id`].
const ID_LEN: usize = 12;

/// An opaque unique identifier, rendered as a 24-character lowercase hex
/// string. Ids are random rather than sequential so they can be minted
/// locally by the builder without a round trip to the store.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Id([u8; ID_LEN]);

impl Id {
    /// Generate a new random ID.
    ///
    /// Uniqueness within a collection is the caller's responsibility; see
    /// `OrderedCollection::fresh_id` for the collision-checked version.
    pub fn new() -> Self {
        Self(rand::thread_rng().gen())
    }

    /// The raw bytes of this ID.
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", HEXLOWER.encode(&self.0))
    }
}

/// Failed to parse a string as an [`Id`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid id {input:?}: expected {} lowercase hex characters", ID_LEN * 2)]
pub struct ParseIdError {
    pub input: String,
}

impl FromStr for Id {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseIdError {
            input: s.to_string(),
        };
        let bytes = HEXLOWER.decode(s.as_bytes()).map_err(|_| err())?;
        let bytes: [u8; ID_LEN] = bytes.try_into().map_err(|_| err())?;
        Ok(Self(bytes))
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trip() {
        let id = Id::new();
        let parsed: Id = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn serde_as_plain_string() {
        let id = Id::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn rejects_bad_input() {
        assert!("".parse::<Id>().is_err());
        assert!("xyz".parse::<Id>().is_err());
        // Too short.
        assert!("abcdef".parse::<Id>().is_err());
        // Uppercase hex is not canonical.
        assert!("ABCDEFABCDEFABCDEFABCDEF".parse::<Id>().is_err());
    }

    #[test]
    fn fresh_ids_are_distinct() {
        let a = Id::new();
        let b = Id::new();
        assert_ne!(a, b);
    }
}
