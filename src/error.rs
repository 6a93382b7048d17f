//! Errors returned by the Lunchly models.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    /// A lookup by id matched no row.
    #[error("No such {entity}: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// A setter or constructor was handed a value that breaks a field invariant.
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ModelError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ModelError::Validation {
            field,
            message: message.into(),
        }
    }

    /// HTTP-equivalent status so a web layer can translate the error directly.
    pub fn status_code(&self) -> u16 {
        match self {
            ModelError::NotFound { .. } => 404,
            ModelError::Validation { .. } => 400,
            ModelError::Database(_) => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ModelError::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ModelError::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
