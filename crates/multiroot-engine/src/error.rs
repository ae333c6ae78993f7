//! Error types for model operations.

use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

/// Errors raised by the document model and its writer.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    /// A root with this name is already part of the document.
    #[error("root `{name}` already exists in the document")]
    #[diagnostic(code(multiroot::model::duplicate_root))]
    DuplicateRoot { name: SmolStr },

    /// No root with this name exists.
    #[error("root `{name}` does not exist in the document")]
    #[diagnostic(code(multiroot::model::unknown_root))]
    UnknownRoot { name: SmolStr },

    /// Offset past the end of the root.
    #[error("offset {offset} is out of range for root `{root}` (length {len})")]
    #[diagnostic(code(multiroot::model::out_of_range))]
    OutOfRange {
        root: SmolStr,
        offset: usize,
        len: usize,
    },

    /// Synchronous change requested while a change block is running.
    #[error("a model change is already in progress")]
    #[diagnostic(
        code(multiroot::model::change_in_progress),
        help("use `enqueue_change` to schedule work from inside a change block")
    )]
    ChangeInProgress,
}
