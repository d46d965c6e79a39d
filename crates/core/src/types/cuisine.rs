//! Cuisine categories.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing a cuisine outside the fixed set.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown cuisine: {0}")]
pub struct UnknownCuisine(pub String);

/// Cuisine of a restaurant.
///
/// The backend stores the label verbatim, so the serialized form is the
/// capitalized name (`"Italian"`, not `"italian"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Cuisine {
    Italian,
    Mexican,
    Japanese,
    #[default]
    American,
    Indian,
}

impl Cuisine {
    /// Every cuisine, in the order the form lists them.
    pub const ALL: [Self; 5] = [
        Self::Italian,
        Self::Mexican,
        Self::Japanese,
        Self::American,
        Self::Indian,
    ];

    /// Display label, identical to the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Italian => "Italian",
            Self::Mexican => "Mexican",
            Self::Japanese => "Japanese",
            Self::American => "American",
            Self::Indian => "Indian",
        }
    }
}

impl fmt::Display for Cuisine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cuisine {
    type Err = UnknownCuisine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCuisine(s.to_string()))
    }
}
