//! Data structures and types for the kiosk slideshow.
//!
//! This module defines the core types shared by the loader, renderer and
//! session: the error taxonomy, the host-supplied options record and the
//! `config.json` record found next to the PDF.

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Candidate file names probed when no explicit PDF location is configured.
pub const DEFAULT_CANDIDATES: [&str; 4] = [
    "exhibition.pdf",
    "presentation.pdf",
    "slides.pdf",
    "document.pdf",
];

/// Errors that can occur while bringing up the slideshow.
///
/// Every variant is terminal for the session: the caller replaces the
/// content area with a readable message and stops. There is no retry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KioskError {
    /// No PDF could be resolved by the configured discovery strategy.
    #[error("{0}")]
    ResourceNotFound(String),
    /// A PDF was found but the rendering library rejected it.
    #[error("PDF could not be opened: {0}")]
    LoadFailure(String),
    /// A specific page failed to rasterize.
    #[error("page {} failed to render: {reason}", .page + 1)]
    RenderFailure {
        /// Zero-based index of the failing page.
        page: usize,
        /// Message reported by the rendering library.
        reason: String,
    },
    /// A container the page layout requires is missing.
    #[error("DOM error: {0}")]
    Dom(String),
}

/// How the PDF location is resolved at startup.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMode {
    /// `config.json` must exist and name an existing PDF. Anything else is fatal.
    #[default]
    Config,
    /// Try `config.json` first, then fall back to the candidate list.
    ConfigWithFallback,
    /// Probe the candidate list in order.
    Candidates,
    /// Use `pdf_path` verbatim without probing.
    Explicit,
}

/// How the current page is positioned and tracked.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    /// Discrete slides moved with a CSS transform on the slides wrapper.
    #[default]
    Paging,
    /// A native scroll-snap container; the current page is derived from
    /// scroll position.
    Scroll,
}

/// Configuration options passed by the host page to `start_kiosk`.
///
/// All fields are optional. Missing fields take the defaults below, so an
/// empty object is a valid configuration.
///
/// # Examples
///
/// Strict discovery with the default layout:
/// ```json
/// {}
/// ```
///
/// Candidate probing with scroll-snap navigation:
/// ```json
/// { "discovery": "candidates", "candidates": ["a.pdf", "b.pdf"], "navigation": "scroll" }
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct KioskOptions {
    /// Folder holding `config.json` and the PDF, relative to the page.
    pub assets_folder: String,
    /// Name of the discovery record inside `assets_folder`.
    pub config_file: String,
    /// Discovery strategy.
    pub discovery: DiscoveryMode,
    /// Ordered file names probed by the candidate strategies.
    pub candidates: Vec<String>,
    /// Fixed PDF location used by [`DiscoveryMode::Explicit`].
    pub pdf_path: Option<String>,
    /// Location of the PDF.js worker script.
    pub worker_src: String,
    /// Rasterization scale factor. Higher values look sharper on large screens.
    pub scale: f64,
    /// Navigation strategy.
    pub navigation: NavigationMode,
    /// Fallback delay before a slide transition counts as finished. Should
    /// match the CSS transition duration plus a small buffer.
    pub transition_ms: u32,
    /// Quiescence period for wheel bursts.
    pub wheel_debounce_ms: u32,
    /// Quiescence period for scroll bursts in scroll mode.
    pub scroll_debounce_ms: u32,
    /// Minimum horizontal travel for a swipe to change page.
    pub min_swipe_px: f64,
    /// Vertical travel beyond which a vertical-dominant swipe is cancelled.
    pub max_vertical_drift_px: f64,
    /// Vertical travel a drag may have before vertical dominance is considered.
    pub vertical_slop_px: f64,
    /// Id of the full-screen content container.
    pub container_id: String,
    /// Id of the element receiving the indicator dots.
    pub dots_id: String,
    /// Id of the optional "previous" button.
    pub prev_button_id: String,
    /// Id of the optional "next" button.
    pub next_button_id: String,
    /// Console log level (`error`, `warn`, `info`, `debug`, `trace`, `off`).
    pub log_level: String,
}

impl Default for KioskOptions {
    fn default() -> Self {
        Self {
            assets_folder: "assets/".into(),
            config_file: "config.json".into(),
            discovery: DiscoveryMode::default(),
            candidates: DEFAULT_CANDIDATES.iter().map(|c| c.to_string()).collect(),
            pdf_path: None,
            worker_src: "./lib/pdf.worker.min.mjs".into(),
            scale: 2.0,
            navigation: NavigationMode::default(),
            transition_ms: 650, // 600ms CSS + 50ms buffer
            wheel_debounce_ms: 50,
            scroll_debounce_ms: 100,
            min_swipe_px: 50.0,
            max_vertical_drift_px: 100.0,
            vertical_slop_px: 10.0,
            container_id: "pdfScrollContainer".into(),
            dots_id: "dotsContainer".into(),
            prev_button_id: "prevBtn".into(),
            next_button_id: "nextBtn".into(),
            log_level: "info".into(),
        }
    }
}

impl KioskOptions {
    /// Parses options from the host-supplied JSON.
    ///
    /// `None` yields the defaults. Malformed JSON is logged and also yields
    /// the defaults; the slideshow should still come up on a kiosk with a
    /// typo in its page script.
    pub fn from_json(options_json: Option<&str>) -> Self {
        let parsed = match options_json {
            Some(s) if !s.trim().is_empty() => serde_json::from_str(s).unwrap_or_else(|e| {
                warn!("ignoring malformed kiosk options: {}", e);
                Self::default()
            }),
            _ => Self::default(),
        };
        parsed.sanitized()
    }

    /// Replaces out-of-range values with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.scale.is_finite() && self.scale > 0.0) {
            warn!("invalid scale {}; using {}", self.scale, defaults.scale);
            self.scale = defaults.scale;
        }
        for (name, value, default) in [
            ("minSwipePx", &mut self.min_swipe_px, defaults.min_swipe_px),
            (
                "maxVerticalDriftPx",
                &mut self.max_vertical_drift_px,
                defaults.max_vertical_drift_px,
            ),
            ("verticalSlopPx", &mut self.vertical_slop_px, defaults.vertical_slop_px),
        ] {
            if !(value.is_finite() && *value >= 0.0) {
                warn!("invalid {} {}; using {}", name, value, default);
                *value = default;
            }
        }
        if self.discovery == DiscoveryMode::Explicit
            && self.pdf_path.as_deref().is_none_or(|p| p.trim().is_empty())
        {
            warn!("explicit discovery without pdfPath; falling back to config discovery");
            self.discovery = DiscoveryMode::Config;
        }
        self
    }

    /// Parsed form of [`KioskOptions::log_level`], defaulting to `Info`.
    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

/// The discovery record stored as `config.json` in the assets folder.
///
/// ```json
/// { "pdfFile": "exhibition.pdf" }
/// ```
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetConfig {
    /// PDF file name relative to the assets folder.
    pub pdf_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_use_defaults() {
        assert_eq!(KioskOptions::from_json(None), KioskOptions::default());
        assert_eq!(KioskOptions::from_json(Some("{}")), KioskOptions::default());
        assert_eq!(KioskOptions::from_json(Some("   ")), KioskOptions::default());
    }

    #[test]
    fn test_malformed_options_fall_back() {
        assert_eq!(
            KioskOptions::from_json(Some("{not json")),
            KioskOptions::default()
        );
    }

    #[test]
    fn test_partial_options() {
        let opts = KioskOptions::from_json(Some(
            r#"{"discovery":"candidates","candidates":["a.pdf"],"navigation":"scroll","transitionMs":400}"#,
        ));
        assert_eq!(opts.discovery, DiscoveryMode::Candidates);
        assert_eq!(opts.candidates, vec!["a.pdf".to_string()]);
        assert_eq!(opts.navigation, NavigationMode::Scroll);
        assert_eq!(opts.transition_ms, 400);
        assert_eq!(opts.scale, 2.0);
    }

    #[test]
    fn test_sanitize_bad_values() {
        let opts = KioskOptions::from_json(Some(
            r#"{"scale":-1,"minSwipePx":-5,"discovery":"explicit"}"#,
        ));
        assert_eq!(opts.scale, 2.0);
        assert_eq!(opts.min_swipe_px, 50.0);
        assert_eq!(opts.discovery, DiscoveryMode::Config);
    }

    #[test]
    fn test_log_filter() {
        let mut opts = KioskOptions::default();
        opts.log_level = "debug".into();
        assert_eq!(opts.log_filter(), log::LevelFilter::Debug);
        opts.log_level = "loud".into();
        assert_eq!(opts.log_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_render_failure_message_is_one_based() {
        let err = KioskError::RenderFailure {
            page: 2,
            reason: "boom".into(),
        };
        assert_eq!(err.to_string(), "page 3 failed to render: boom");
    }

    #[test]
    fn test_asset_config() {
        let cfg: AssetConfig = serde_json::from_str(r#"{"pdfFile":"x.pdf"}"#).unwrap();
        assert_eq!(cfg.pdf_file.as_deref(), Some("x.pdf"));
        let cfg: AssetConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.pdf_file, None);
    }
}
