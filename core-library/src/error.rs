use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Duplicate {entity_type}: {key}")]
    Duplicate { entity_type: String, key: String },

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Migration failed: {0}")]
    Migration(String),
}

impl LibraryError {
    /// Map an insert failure, turning unique-constraint violations into
    /// [`LibraryError::Duplicate`].
    pub(crate) fn from_insert(err: sqlx::Error, entity_type: &str, key: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                LibraryError::Duplicate {
                    entity_type: entity_type.to_string(),
                    key: key.to_string(),
                }
            }
            _ => LibraryError::Database(err),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, LibraryError::Duplicate { .. })
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
