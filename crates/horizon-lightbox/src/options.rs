//! Initialization options.
//!
//! [`LightboxOptions`] mirrors the object passed to `initMediaLightbox` on
//! the JavaScript side, so field names are camelCase on the wire. The
//! snake_case spellings are accepted too, which reads better in TOML:
//!
//! ```toml
//! target_selector = ".prose img, .prose svg"
//! lightbox_id = "media-lightbox"
//! content_id = "media-lightbox-content"
//!
//! [conventions]
//! scroll_lock_class = "no-scroll"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Selector for the close control when none is given.
pub const DEFAULT_CLOSE_SELECTOR: &str = "[data-close-lightbox]";

/// Marker attribute set on the overlay once it has been initialized.
pub const INITIALIZED_ATTR: &str = "data-lightbox-initialized";

/// Marker attribute set on each target once its listeners are attached.
pub const BOUND_ATTR: &str = "data-lightbox-bound";

/// Options for [`init_media_lightbox`](crate::init_media_lightbox).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightboxOptions {
    /// Selector choosing which elements become zoomable.
    #[serde(alias = "target_selector")]
    pub target_selector: String,
    /// ID of the overlay root element.
    #[serde(alias = "lightbox_id")]
    pub lightbox_id: String,
    /// ID of the content slot inside the overlay.
    #[serde(alias = "content_id")]
    pub content_id: String,
    /// Selector for the close control, scoped to the overlay.
    #[serde(default, alias = "close_selector", skip_serializing_if = "Option::is_none")]
    pub close_selector: Option<String>,
    /// Class names and labels the widget writes into the page.
    #[serde(default)]
    pub conventions: MarkupConventions,
}

impl LightboxOptions {
    /// Create options with the default close selector and conventions.
    pub fn new(
        target_selector: impl Into<String>,
        lightbox_id: impl Into<String>,
        content_id: impl Into<String>,
    ) -> Self {
        Self {
            target_selector: target_selector.into(),
            lightbox_id: lightbox_id.into(),
            content_id: content_id.into(),
            close_selector: None,
            conventions: MarkupConventions::default(),
        }
    }

    /// Set the close control selector.
    pub fn with_close_selector(mut self, selector: impl Into<String>) -> Self {
        self.close_selector = Some(selector.into());
        self
    }

    /// Replace the markup conventions.
    pub fn with_conventions(mut self, conventions: MarkupConventions) -> Self {
        self.conventions = conventions;
        self
    }

    /// The close selector in effect.
    pub fn close_selector(&self) -> &str {
        self.close_selector
            .as_deref()
            .unwrap_or(DEFAULT_CLOSE_SELECTOR)
    }

    /// Parse options from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let options: Self = toml::from_str(source)?;
        options.validate()?;
        Ok(options)
    }

    /// Parse options from JSON.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(source)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a `.toml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match format {
            ConfigFormat::Toml => Self::from_toml_str(&source),
            ConfigFormat::Json => Self::from_json_str(&source),
        }
    }

    /// Reject blank required fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("targetSelector", &self.target_selector),
            ("lightboxId", &self.lightbox_id),
            ("contentId", &self.content_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(name));
            }
        }
        if self
            .close_selector
            .as_deref()
            .is_some_and(|s| s.trim().is_empty())
        {
            return Err(ConfigError::MissingField("closeSelector"));
        }
        Ok(())
    }
}

/// File formats accepted by [`LightboxOptions::from_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML.
    Toml,
    /// JSON.
    Json,
}

impl ConfigFormat {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else if extension.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }
}

/// Class names and labels the widget writes into the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkupConventions {
    /// Class that hides the overlay.
    #[serde(alias = "hidden_class")]
    pub hidden_class: String,
    /// Class added to `<body>` while the overlay is open.
    #[serde(alias = "scroll_lock_class")]
    pub scroll_lock_class: String,
    /// Pointer-style class added to each target.
    #[serde(alias = "cursor_class")]
    pub cursor_class: String,
    /// `aria-label` given to targets that have none.
    #[serde(alias = "aria_label")]
    pub aria_label: String,
}

impl Default for MarkupConventions {
    fn default() -> Self {
        Self {
            hidden_class: "hidden".to_string(),
            scroll_lock_class: "overflow-hidden".to_string(),
            cursor_class: "cursor-zoom-in".to_string(),
            aria_label: "Enlarge media".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_uses_camel_case() {
        let options = LightboxOptions::from_json_str(
            r#"{"targetSelector": ".prose img", "lightboxId": "lb", "contentId": "lb-content"}"#,
        )
        .unwrap();
        assert_eq!(options.target_selector, ".prose img");
        assert_eq!(options.close_selector(), DEFAULT_CLOSE_SELECTOR);
        assert_eq!(options.conventions, MarkupConventions::default());
    }

    #[test]
    fn toml_accepts_snake_case_and_partial_conventions() {
        let options = LightboxOptions::from_toml_str(
            r#"
            target_selector = "figure svg"
            lightbox_id = "lb"
            content_id = "lb-content"
            close_selector = ".close"

            [conventions]
            scroll_lock_class = "no-scroll"
            "#,
        )
        .unwrap();
        assert_eq!(options.close_selector(), ".close");
        assert_eq!(options.conventions.scroll_lock_class, "no-scroll");
        assert_eq!(options.conventions.hidden_class, "hidden");
    }

    #[test]
    fn missing_required_field_is_a_parse_error() {
        let err = LightboxOptions::from_json_str(r#"{"targetSelector": "img"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn blank_fields_fail_validation() {
        let err = LightboxOptions::from_json_str(
            r#"{"targetSelector": "img", "lightboxId": "  ", "contentId": "c"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("lightboxId")));

        let options = LightboxOptions::new("img", "lb", "c").with_close_selector("");
        assert!(matches!(
            options.validate(),
            Err(ConfigError::MissingField("closeSelector"))
        ));
    }

    #[test]
    fn serializes_without_default_close_selector() {
        let json = serde_json::to_string(&LightboxOptions::new("img", "lb", "c")).unwrap();
        assert!(json.contains("\"targetSelector\":\"img\""));
        assert!(!json.contains("closeSelector"));
    }

    #[test]
    fn from_file_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("lightbox.toml");
        std::fs::write(&toml_path, "targetSelector = \"img\"\nlightboxId = \"lb\"\ncontentId = \"c\"\n")
            .unwrap();
        assert_eq!(
            LightboxOptions::from_file(&toml_path).unwrap(),
            LightboxOptions::new("img", "lb", "c")
        );

        let json_path = dir.path().join("lightbox.JSON");
        std::fs::write(&json_path, r#"{"targetSelector":"svg","lightboxId":"lb","contentId":"c"}"#)
            .unwrap();
        assert_eq!(
            LightboxOptions::from_file(&json_path).unwrap().target_selector,
            "svg"
        );

        let yaml_path = dir.path().join("lightbox.yaml");
        std::fs::write(&yaml_path, "").unwrap();
        assert!(matches!(
            LightboxOptions::from_file(&yaml_path),
            Err(ConfigError::UnsupportedFormat { .. })
        ));

        assert!(matches!(
            LightboxOptions::from_file(dir.path().join("absent.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
