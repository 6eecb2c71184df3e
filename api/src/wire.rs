//! Raw wire shapes shared by every league API response.
//! The domain records in lib.rs embed [`Numeric`] for fields the backend
//! sends either as JSON numbers or as their string form.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    #[default]
    Success,
    Error,
}

/// `{ status, message, data?, error? }` wrapper every endpoint answers with.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: EnvelopeStatus,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }

    /// Best human-readable reason carried by an error envelope.
    pub fn failure_message(&self) -> Option<String> {
        [self.message.as_str(), self.error.as_deref().unwrap_or_default()]
            .into_iter()
            .map(str::trim)
            .find(|m| !m.is_empty())
            .map(str::to_owned)
    }
}

/// Loose view of an error body: only the fields needed for a message.
/// Used for non-2xx responses whose `data` may not match the expected type.
#[derive(Debug, Deserialize, Default)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message
            .into_iter()
            .chain(self.error)
            .map(|m| m.trim().to_owned())
            .find(|m| !m.is_empty())
    }
}

/// The player-performance list nests its rows one level deeper than every
/// other endpoint (`data.data`). Both shapes are accepted; a missing or
/// null inner `data` is an empty page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PerformancePage<T> {
    Nested {
        #[serde(default)]
        data: Option<Vec<T>>,
    },
    Flat(Vec<T>),
}

impl<T> PerformancePage<T> {
    pub fn into_rows(self) -> Vec<T> {
        match self {
            PerformancePage::Nested { data } => data.unwrap_or_default(),
            PerformancePage::Flat(rows) => rows,
        }
    }
}

// ---------------------------------------------------------------------------
// String-or-number fields
// ---------------------------------------------------------------------------

/// A numeric field as the backend sends it. Resolve with [`Numeric::value`];
/// never parse the text ad hoc.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Numeric {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl Numeric {
    /// Normalised value: numbers pass through, strings are parsed as `f64`,
    /// anything unparseable, non-finite or absent is `0`.
    pub fn value(&self) -> f64 {
        let parsed = match self {
            Numeric::Number(n) => *n,
            Numeric::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Numeric::Missing => 0.0,
        };
        if parsed.is_finite() { parsed } else { 0.0 }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Numeric::Missing)
    }
}

/// Free-function form of [`Numeric::value`] for optional fields.
pub fn safe_number(value: Option<&Numeric>) -> f64 {
    value.map(Numeric::value).unwrap_or(0.0)
}

impl From<f64> for Numeric {
    fn from(n: f64) -> Self {
        Numeric::Number(n)
    }
}

impl From<&str> for Numeric {
    fn from(s: &str) -> Self {
        Numeric::Text(s.to_owned())
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*}", p, self.value()),
            None => write!(f, "{}", self.value()),
        }
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NumericVisitor;

        impl<'de> Visitor<'de> for NumericVisitor {
            type Value = Numeric;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number, a numeric string or null")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Numeric, E> {
                Ok(Numeric::Number(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Numeric, E> {
                Ok(Numeric::Number(v as f64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Numeric, E> {
                Ok(Numeric::Number(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Numeric, E> {
                Ok(Numeric::Text(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Numeric, E> {
                Ok(Numeric::Text(v))
            }

            fn visit_bool<E: de::Error>(self, _: bool) -> Result<Numeric, E> {
                Ok(Numeric::Missing)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Numeric, E> {
                Ok(Numeric::Missing)
            }

            fn visit_none<E: de::Error>(self) -> Result<Numeric, E> {
                Ok(Numeric::Missing)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Numeric, D::Error> {
                d.deserialize_any(NumericVisitor)
            }
        }

        deserializer.deserialize_any(NumericVisitor)
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Numeric::Number(n) => serializer.serialize_f64(*n),
            Numeric::Text(s) => serializer.serialize_str(s),
            Numeric::Missing => serializer.serialize_none(),
        }
    }
}
