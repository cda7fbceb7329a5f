//! Core types for the emitter.

use crate::error::EmitterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a subscription within one registry.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Secondary key scoping a subscription to one logical subscriber.
///
/// Reads as a plain JSON string or number when serialized.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Number(i64),
    Name(String),
}

impl Identifier {
    /// Whether this identifier is "falsy": the number zero or the empty name.
    ///
    /// Under [`IdentifierMatching::Truthy`](crate::IdentifierMatching::Truthy)
    /// an emit scoped by a falsy identifier behaves like an unscoped emit.
    pub fn is_falsy(&self) -> bool {
        match self {
            Identifier::Number(n) => *n == 0,
            Identifier::Name(s) => s.is_empty(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Number(n) => write!(f, "{}", n),
            Identifier::Name(s) => write!(f, "{}", s),
        }
    }
}

/// Parses integers as [`Identifier::Number`], anything else as a name.
impl FromStr for Identifier {
    type Err = EmitterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(EmitterError::InvalidIdentifier(
                "identifier must not be empty".to_string(),
            ));
        }
        Ok(match s.parse::<i64>() {
            Ok(n) => Identifier::Number(n),
            Err(_) => Identifier::Name(s.to_string()),
        })
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier::Name(s.to_string())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Identifier::Name(s)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Identifier {
                fn from(n: $t) -> Self {
                    Identifier::Number(i64::from(n))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

/// Outcome of a strict emit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Callbacks invoked.
    pub invoked: usize,
    /// One-shot subscriptions removed after firing.
    pub removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falsy_identifiers() {
        assert!(Identifier::from(0).is_falsy());
        assert!(Identifier::from("").is_falsy());
        assert!(!Identifier::from(-1).is_falsy());
        assert!(!Identifier::from("0").is_falsy());
    }

    #[test]
    fn test_parse_identifier() {
        assert_eq!("42".parse::<Identifier>().unwrap(), Identifier::Number(42));
        assert_eq!(
            "panel".parse::<Identifier>().unwrap(),
            Identifier::Name("panel".to_string())
        );
        assert!(matches!(
            "".parse::<Identifier>(),
            Err(EmitterError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_option_conversions() {
        let scoped: Option<Identifier> = Identifier::from(7u8).into();
        assert_eq!(scoped, Some(Identifier::Number(7)));
        assert_eq!(Identifier::from("a").to_string(), "a");
    }

    #[test]
    fn test_identifier_serde_untagged() {
        let json = serde_json::to_string(&Identifier::from(3)).unwrap();
        assert_eq!(json, "3");

        let back: Identifier = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(back, Identifier::from("user"));
    }
}
