//! Error types for the document model.

use std::path::PathBuf;

/// Result type alias for document operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, querying or mutating a [`Document`](crate::Document).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Selector parsing error.
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    /// The node ID is invalid or the node has been destroyed.
    #[error("Invalid or destroyed node ID")]
    NodeNotFound,

    /// The operation requires an element but the node is a text node.
    #[error("Node is not an element")]
    NotAnElement,

    /// The mutation would make a node its own ancestor.
    #[error("Cannot insert a node into itself or one of its descendants")]
    HierarchyRequest,

    /// Markup parsing error.
    #[error("Markup parse error at byte {position}: {message}")]
    Markup { message: String, position: u64 },

    /// File I/O error.
    #[error("Failed to read markup '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a selector error.
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Create a markup error.
    pub fn markup(message: impl Into<String>, position: u64) -> Self {
        Self::Markup {
            message: message.into(),
            position,
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
