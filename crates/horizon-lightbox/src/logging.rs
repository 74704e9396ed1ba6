//! Tracing targets for the lightbox.
//!
//! Initialization failures are logged at `debug` under [`targets::INIT`]
//! and never surface to the page. Enable them while wiring up markup:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_lightbox=debug")
//!     .init();
//! ```

/// Target names for log filtering.
pub mod targets {
    /// Open and close transitions.
    pub const LIGHTBOX: &str = "horizon_lightbox::lightbox";
    /// Initialization and target binding.
    pub const INIT: &str = "horizon_lightbox::init";
    /// DOM host operations.
    pub const HOST: &str = "horizon_lightbox::host";
    /// Browser host.
    pub const WEB: &str = "horizon_lightbox::web";
}
