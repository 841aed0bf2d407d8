//! Serde helpers for query strings.
//!
//! Blank query values (`?year=&property=`) arrive as empty strings, which
//! `serde_urlencoded` cannot parse as numbers. These helpers read them as
//! `None`.
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

pub fn deserialize_optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Blank strings become `None`; anything else is kept verbatim.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|v| !v.trim().is_empty()))
}

/// Checkbox-style flag: `1`, `true`, `on` and `yes` are set, blank or
/// missing is unset.
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(|v| v.trim().to_lowercase()).as_deref() {
        None | Some("") | Some("0") | Some("false") | Some("off") | Some("no") => Ok(false),
        Some("1") | Some("true") | Some("on") | Some("yes") => Ok(true),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid flag value '{}'",
            other
        ))),
    }
}
