//! Error types for the lightbox.

use std::path::PathBuf;

/// Result type alias for lightbox operations.
pub type Result<T> = std::result::Result<T, LightboxError>;

/// Why the lightbox could not be initialized or an operation failed.
///
/// Initialization errors are never surfaced to the page:
/// [`init_media_lightbox`](crate::init_media_lightbox) logs them and leaves
/// the page untouched.
#[derive(Debug, thiserror::Error)]
pub enum LightboxError {
    /// No element carries the overlay ID.
    #[error("Lightbox overlay '#{id}' not found")]
    OverlayNotFound { id: String },

    /// No element carries the content slot ID.
    #[error("Lightbox content slot '#{id}' not found")]
    ContentNotFound { id: String },

    /// Nothing inside the overlay matches the close selector.
    #[error("No close control matching '{selector}' inside the overlay")]
    CloseControlNotFound { selector: String },

    /// The close control cannot take focus or clicks.
    #[error("Close control is not an interactive HTML element")]
    CloseControlNotInteractive,

    /// The overlay was already set up by an earlier call.
    #[error("Lightbox overlay is already initialized")]
    AlreadyInitialized,

    /// A target or close selector could not be parsed.
    #[error("Invalid selector: {0}")]
    Selector(#[source] horizon_lightbox_dom::Error),

    /// A document operation failed.
    #[error("Document error: {0}")]
    Dom(#[from] horizon_lightbox_dom::Error),

    /// The browser rejected a DOM call.
    #[error("Host error during {operation}: {message}")]
    Host {
        operation: &'static str,
        message: String,
    },

    /// The options were invalid or could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl LightboxError {
    /// Create a host error.
    pub fn host(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Host {
            operation,
            message: message.into(),
        }
    }

    /// Check whether this is one of the silent "markup missing" guards
    /// rather than a programming or configuration mistake.
    pub fn is_missing_markup(&self) -> bool {
        matches!(
            self,
            Self::OverlayNotFound { .. }
                | Self::ContentNotFound { .. }
                | Self::CloseControlNotFound { .. }
                | Self::CloseControlNotInteractive
        )
    }
}

/// Errors loading or validating [`LightboxOptions`](crate::LightboxOptions).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The options file could not be read.
    #[error("Failed to read options '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parse error.
    #[error("Invalid TOML options: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parse error.
    #[error("Invalid JSON options: {0}")]
    Json(#[from] serde_json::Error),

    /// A required option is empty.
    #[error("Required option '{0}' is empty")]
    MissingField(&'static str),

    /// The file extension is neither `.toml` nor `.json`.
    #[error("Unsupported options format '{}'", path.display())]
    UnsupportedFormat { path: PathBuf },
}
