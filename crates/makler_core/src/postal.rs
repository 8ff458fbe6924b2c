use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use admin_logging::admin_warn;
use serde::Serialize;

const POSTAL_CODE_LEN: usize = 5;

/// A German postal code (PLZ): exactly five ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PostalCode(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid postal code {0:?}: expected exactly 5 digits")]
pub struct InvalidPostalCode(pub String);

impl PostalCode {
    pub fn parse(raw: &str) -> Result<Self, InvalidPostalCode> {
        if is_postal_code(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidPostalCode(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PostalCode {
    type Err = InvalidPostalCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub(crate) fn is_postal_code(raw: &str) -> bool {
    raw.len() == POSTAL_CODE_LEN && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Ordered, deduplicated postal codes parsed from free-form operator text.
///
/// Tokens may be separated by any mix of newlines, commas and semicolons.
/// Malformed tokens never fail the parse; they are kept in [`rejected`](Self::rejected)
/// so the caller can show them as warnings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostalCodeSet {
    codes: Vec<PostalCode>,
    rejected: Vec<String>,
    duplicates: usize,
}

impl PostalCodeSet {
    pub fn parse(text: &str) -> Self {
        let mut set = Self::default();
        let mut seen = HashSet::new();

        let tokens = text
            .split(['\n', '\r', ',', ';'])
            .map(str::trim)
            .filter(|token| !token.is_empty());

        for token in tokens {
            match PostalCode::parse(token) {
                Ok(code) => {
                    if seen.insert(code.clone()) {
                        set.codes.push(code);
                    } else {
                        set.duplicates += 1;
                    }
                }
                Err(_) => {
                    admin_warn!("Skipping invalid postal code: {:?}", token);
                    set.rejected.push(token.to_string());
                }
            }
        }

        set
    }

    pub fn codes(&self) -> &[PostalCode] {
        &self.codes
    }

    /// Tokens that were dropped because they are not five digits.
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    /// Number of valid tokens dropped as repeats of an earlier code.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PostalCode> {
        self.codes.iter()
    }

    pub fn into_codes(self) -> Vec<PostalCode> {
        self.codes
    }
}
