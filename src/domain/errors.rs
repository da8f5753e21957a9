use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Access denied")]
    AccessDenied,

    #[error("Only owner can {action}")]
    OwnerOnly { action: &'static str },

    #[error("Cannot share a project with its owner")]
    ShareWithOwner,

    #[error("Design object not found: {0}")]
    ObjectNotFound(String),

    #[error("Invalid document {collection}/{id}: {reason}")]
    InvalidDocument {
        collection: String,
        id: String,
        reason: String,
    },
}
