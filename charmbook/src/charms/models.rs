//! Charm data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::pages::PageId;

/// Charm ID type
pub type CharmId = String;

/// Maximum length of a charm's text value, in bytes
pub const MAX_TEXT_LEN: usize = 256;

/// Charm model
///
/// A charm has no owner of its own; it belongs to whoever owns `page_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charm {
    pub id: CharmId,
    pub page_id: PageId,
    pub shape: Shape,
    pub color: Color,
    pub title: String,
    pub text_value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Charm creation request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharmInput {
    #[serde(default)]
    pub shape: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text_value: String,
}

/// Charm update request
///
/// Absent or empty fields keep the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharmPatch {
    pub shape: Option<String>,
    pub color: Option<String>,
    pub title: Option<String>,
    pub text_value: Option<String>,
}

/// Error returned when a shape or color name is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

macro_rules! named_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every accepted value
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

named_enum! {
    /// Charm outline
    Shape {
        Square => "square",
        Star => "star",
        Circle => "circle",
        Triangle => "triangle",
        Rectangle => "rectangle",
        Diamond => "diamond",
        Heart => "heart",
        Clover => "clover",
        Spade => "spade",
        Hexagon => "hexagon",
        Squiggle => "squiggle",
    }
}

named_enum! {
    /// Charm fill color
    Color {
        Red => "red",
        Green => "green",
        Blue => "blue",
        Yellow => "yellow",
        Purple => "purple",
        Pink => "pink",
        Gold => "gold",
        Black => "black",
        Orange => "orange",
        DarkGray => "darkgray",
    }
}
