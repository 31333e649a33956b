use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load {source_name}: {reason}")]
    Load { source_name: String, reason: String },

    #[error("Invalid table: {0}")]
    Table(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AuditError {
    pub fn load(source_name: impl Into<String>, reason: impl ToString) -> Self {
        AuditError::Load {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}
