use std::fmt;

use rand_core::{OsRng, RngCore};
use thiserror::Error;

/// Number of random bytes behind every key
const KEY_BYTES: usize = 4;
const KEY_LENGTH: usize = KEY_BYTES * 2;

/// Short identifier of a stored url, 8 lowercase hex characters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(String);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("key must be exactly {KEY_LENGTH} characters long")]
    WrongLength,
    #[error("key contains characters other than lowercase hex digits")]
    InvalidCharacters,
}

impl Key {
    /// Draws a fresh key from the OS random number generator
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_BYTES];
        OsRng.fill_bytes(&mut bytes);

        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    pub fn parse(input: &str) -> Result<Self, KeyParseError> {
        if input.len() != KEY_LENGTH {
            return Err(KeyParseError::WrongLength);
        }
        if input.contains(|c: char| !matches!(c, '0'..='9' | 'a'..='f')) {
            return Err(KeyParseError::InvalidCharacters);
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Key {
    type Error = KeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
