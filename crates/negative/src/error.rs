//! Error types for the wrapper
//!
//! Only the factory fails loudly; everything else degrades or logs.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("No selectors provided. Please provide at least one selector or HTML string.")]
    EmptySelectorList,

    #[error("Invalid selector at position {index}. Please provide a string selector or an array of selectors.")]
    InvalidSelector { index: usize },
}
