#![forbid(unsafe_code)]

use sl_core::ids::TableIdError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] TableIdError),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("duplicate identifier: {0}")]
    DuplicateIdentifier(String),
    #[error("unknown table: {0}")]
    UnknownTable(String),
    #[error("table provisioning gave up after {attempts} attempts (last tried {last})")]
    ProvisionExhausted { attempts: usize, last: String },
}

impl StoreError {
    /// Stable machine-readable code for front ends.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) | Self::Sql(_) => "STORAGE_FAILURE",
            Self::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            Self::InvalidInput(message) if message.starts_with("RESET_REQUIRED") => {
                "RESET_REQUIRED"
            }
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::DuplicateIdentifier(_) => "DUPLICATE_IDENTIFIER",
            Self::UnknownTable(_) => "NOT_FOUND",
            Self::ProvisionExhausted { .. } => "PROVISION_EXHAUSTED",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownTable(_))
    }
}
