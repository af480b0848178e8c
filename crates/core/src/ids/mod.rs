#![forbid(unsafe_code)]

//! Table identifiers.
//!
//! Dynamic tables are addressed by name inside SQL text, because SQLite cannot
//! bind an identifier as a parameter. A [`TableId`] can only be obtained
//! through [`TableId::derive`] or [`TableId::parse`], both of which enforce the
//! `products_<N>` shape over the `[a-z0-9_]` alphabet. Holding a `TableId` is
//! therefore proof that the string is safe to splice into a statement.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed prefix shared by every dynamic table.
pub const TABLE_PREFIX: &str = "products";

/// PostgreSQL's identifier limit. SQLite has none.
pub const MAX_TABLE_ID_LEN: usize = 63;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableId(String);

impl TableId {
    /// Formats `products_<sequence>`. Only positive sequence numbers are valid.
    pub fn derive(sequence: i64) -> Result<Self, TableIdError> {
        if sequence <= 0 {
            return Err(TableIdError::NonPositiveSequence);
        }
        let value = format!("{TABLE_PREFIX}_{sequence}");
        validate_table_id(&value)?;
        Ok(Self(value))
    }

    /// Re-validates an identifier that arrived from a caller.
    pub fn parse(value: &str) -> Result<Self, TableIdError> {
        validate_table_id(value)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The numeric suffix. Always positive for a constructed id.
    pub fn sequence(&self) -> i64 {
        // validate_table_id guarantees the suffix parses.
        self.0
            .rsplit_once('_')
            .and_then(|(_, digits)| digits.parse::<i64>().ok())
            .unwrap_or_default()
    }

    /// The identifier with the next sequence number.
    pub fn successor(&self) -> Result<Self, TableIdError> {
        let next = self
            .sequence()
            .checked_add(1)
            .ok_or(TableIdError::InvalidSequence)?;
        Self::derive(next)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TableId {
    type Error = TableIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_table_id(&value)?;
        Ok(Self(value))
    }
}

impl TryFrom<&str> for TableId {
    type Error = TableIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TableId> for String {
    fn from(value: TableId) -> Self {
        value.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TableIdError {
    #[error("table id must not be empty")]
    Empty,
    #[error("table id is too long")]
    TooLong,
    #[error("table id must start with 'products_'")]
    MissingPrefix,
    #[error("table id contains invalid character {ch:?} at index {index}")]
    InvalidChar { ch: char, index: usize },
    #[error("table id must end with a canonical positive integer")]
    InvalidSequence,
    #[error("table sequence number must be positive")]
    NonPositiveSequence,
}

impl TableIdError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "table id must not be empty",
            Self::TooLong => "table id is too long",
            Self::MissingPrefix => "table id has the wrong prefix",
            Self::InvalidChar { .. } => "table id contains characters outside [a-z0-9_]",
            Self::InvalidSequence => "table id suffix is not a canonical positive integer",
            Self::NonPositiveSequence => "table sequence number must be positive",
        }
    }
}

/// Returns true when `name` looks like `<prefix>_<digits>` with a canonical
/// positive number. Used to count physical tables that belong to a prefix.
pub fn is_sequenced_name(name: &str, prefix: &str) -> bool {
    let Some(rest) = name.strip_prefix(prefix) else {
        return false;
    };
    let Some(digits) = rest.strip_prefix('_') else {
        return false;
    };
    is_canonical_positive(digits)
}

fn is_canonical_positive(digits: &str) -> bool {
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0')
        && digits.parse::<i64>().is_ok()
}

fn validate_table_id(value: &str) -> Result<(), TableIdError> {
    if value.is_empty() {
        return Err(TableIdError::Empty);
    }
    if value.len() > MAX_TABLE_ID_LEN {
        return Err(TableIdError::TooLong);
    }
    for (index, ch) in value.chars().enumerate() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' {
            continue;
        }
        return Err(TableIdError::InvalidChar { ch, index });
    }
    let Some(digits) = value
        .strip_prefix(TABLE_PREFIX)
        .and_then(|rest| rest.strip_prefix('_'))
    else {
        return Err(TableIdError::MissingPrefix);
    };
    if !is_canonical_positive(digits) {
        return Err(TableIdError::InvalidSequence);
    }
    Ok(())
}
