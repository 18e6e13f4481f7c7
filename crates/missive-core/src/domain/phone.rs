use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_COUNTRY_CODE: &str = "91";

/// Length of a national number that still needs the default country code.
const NATIONAL_NUMBER_DIGITS: usize = 10;
const MAX_COUNTRY_CODE_DIGITS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if digits.is_empty()
            || digits.len() > MAX_COUNTRY_CODE_DIGITS
            || !digits.chars().all(|ch| ch.is_ascii_digit())
        {
            return Err(CoreError::InvalidCountryCode(raw.to_string()));
        }
        Ok(Self(digits.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CountryCode {
    fn default() -> Self {
        Self(DEFAULT_COUNTRY_CODE.to_string())
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CountryCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CountryCode> for String {
    fn from(value: CountryCode) -> Self {
        value.0
    }
}

/// Digits only; a bare ten-digit national number gets `country_code` in front.
/// Every other shape is returned as the stripped digit string.
pub fn normalize_phone(raw: &str, country_code: &CountryCode) -> String {
    let digits: String = raw.chars().filter(|ch| ch.is_ascii_digit()).collect();
    if digits.len() == NATIONAL_NUMBER_DIGITS {
        let mut out = String::with_capacity(country_code.as_str().len() + digits.len());
        out.push_str(country_code.as_str());
        out.push_str(&digits);
        return out;
    }
    digits
}

#[derive(Debug, Clone, Default)]
pub struct PhoneNormalizer {
    country_code: CountryCode,
}

impl PhoneNormalizer {
    pub fn new(country_code: CountryCode) -> Self {
        Self { country_code }
    }

    pub fn country_code(&self) -> &CountryCode {
        &self.country_code
    }

    pub fn normalize(&self, raw: &str) -> String {
        normalize_phone(raw, &self.country_code)
    }
}
