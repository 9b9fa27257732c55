//! Error handling for the application

use crate::pricing::QuoteError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Text safe to show to a visitor.
    ///
    /// Backend and configuration details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound => "No se encontró el registro solicitado".to_string(),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Error de conexión. Inténtalo de nuevo en unos minutos.".to_string()
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                "Servicio no disponible temporalmente".to_string()
            }
            AppError::Quote(e) => e.user_message(),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Error interno".to_string()
            }
        }
    }

    /// True when the backend reported that a table or view does not exist
    /// (Postgres `undefined_table`, SQLSTATE 42P01).
    pub fn is_missing_relation(&self) -> bool {
        match self {
            AppError::Database(sqlx::Error::Database(db)) => {
                db.code().as_deref() == Some("42P01")
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_error_passes_through_display() {
        let err: AppError = QuoteError::RouteUnavailable { leg: Some(1) }.into();
        assert!(err.to_string().contains("leg 2"));
    }

    #[test]
    fn test_non_database_errors_are_not_missing_relation() {
        assert!(!AppError::NotFound.is_missing_relation());
        assert!(!AppError::Database(sqlx::Error::RowNotFound).is_missing_relation());
    }

    #[test]
    fn test_user_message_hides_internal_details() {
        let err = AppError::Internal("pool exhausted at 10.0.0.3".to_string());
        assert!(!err.user_message().contains("10.0.0.3"));
    }
}
