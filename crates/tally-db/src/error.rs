use thiserror::Error;

/// Outcome of a rejected domain operation. The `Display` text is what the
/// HTTP layer shows to users.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Name is required")]
    EmptyName,

    #[error("A user with that name already exists")]
    DuplicateName,

    #[error("User not found")]
    UserNotFound,

    #[error("Internal server error")]
    Storage(#[from] anyhow::Error),

    #[error("Failed to save changes")]
    SaveFailed,
}
