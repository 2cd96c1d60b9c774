//! Error types for the lifecycle service.

use tmpc_directory::DirectoryError;

/// Errors surfaced by service operations.
///
/// Not-found conditions from the directories are not represented here:
/// every caller in this crate treats them as an already-satisfied goal
/// state and swallows them at the call site.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The deny-list covered the entire palette.
    #[error("no container color available: deny-list covers the palette")]
    NoColorAvailable,
    /// Transient directory failure, propagated to the invoking handler.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

pub type Result<T> = std::result::Result<T, Error>;
