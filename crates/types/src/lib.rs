//! Shared validated primitives for the portal organization crates.

use std::fmt;
use std::str::FromStr;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Errors that can occur when parsing organization identifiers.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OrgIdError {
    #[error("organization id cannot be empty")]
    Empty,
    #[error("organization id is not a non-negative integer: {0}")]
    NotNumeric(String),
}

/// Identifier of an organization as assigned by the directory service.
///
/// `OrgId::NONE` (`0`) is reserved for "no organization / none of the above" and is never
/// treated as a top-level organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrgId(u64);

impl OrgId {
    /// The reserved "none of the above" organization.
    pub const NONE: OrgId = OrgId(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Parse the trailing segment of a reference such as `api/organization/12`.
    ///
    /// A bare id (`"12"`) is accepted as well. Trailing slashes are ignored.
    pub fn from_reference(reference: &str) -> Result<Self, OrgIdError> {
        let last = reference
            .trim()
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
        last.parse()
    }
}

impl FromStr for OrgId {
    type Err = OrgIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(OrgIdError::Empty);
        }
        trimmed
            .parse::<u64>()
            .map(OrgId)
            .map_err(|_| OrgIdError::NotNumeric(trimmed.to_owned()))
    }
}

impl From<u64> for OrgId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for OrgId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for OrgId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct OrgIdVisitor;

        impl serde::de::Visitor<'_> for OrgIdVisitor {
            type Value = OrgId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or numeric string")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<OrgId, E> {
                Ok(OrgId(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<OrgId, E> {
                u64::try_from(v)
                    .map(OrgId)
                    .map_err(|_| E::custom(OrgIdError::NotNumeric(v.to_string())))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<OrgId, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(OrgIdVisitor)
    }
}

/// A BCP-47 language code such as `en_US` or `es`.
///
/// The input is trimmed and must contain at least one non-whitespace character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Creates a new `LanguageCode` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for LanguageCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for LanguageCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        LanguageCode::new(&s).map_err(serde::de::Error::custom)
    }
}
