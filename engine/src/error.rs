use parlor_context::{EstimateError, PersistError};
use thiserror::Error;

use crate::edit::EditError;

/// A handler failure. The dispatcher shows every variant to the user as a
/// `> ` notice; none of them end the session.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown argument to verbose command.")]
    UnknownVerboseArgument,
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("Token estimate unavailable: {0}")]
    Estimate(#[from] EstimateError),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error("Shell command failed: {0}")]
    Shell(String),
}
