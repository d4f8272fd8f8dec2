//! PDF location discovery.
//!
//! Resolves where the slideshow's PDF lives before anything is handed to
//! PDF.js. The strategy is chosen once from [`KioskOptions::discovery`];
//! all network checks go through a [`ResourceProbe`] and run strictly one
//! after another.

use crate::schema::{AssetConfig, DiscoveryMode, KioskError, KioskOptions};
use log::{debug, info};

/// Existence checks and small text fetches against the asset host.
#[allow(async_fn_in_trait)]
pub trait ResourceProbe {
    /// Returns `true` when `url` answers successfully.
    async fn exists(&self, url: &str) -> bool;
    /// Fetches `url` as text. `None` when it is missing or unreachable.
    async fn fetch_text(&self, url: &str) -> Option<String>;
}

/// A discovery strategy bound to concrete folder, record and candidate names.
#[derive(Debug, Clone, PartialEq)]
pub struct Discovery {
    mode: DiscoveryMode,
    assets_folder: String,
    config_file: String,
    candidates: Vec<String>,
    pdf_path: Option<String>,
}

impl Discovery {
    pub fn from_options(options: &KioskOptions) -> Self {
        Self {
            mode: options.discovery,
            assets_folder: options.assets_folder.clone(),
            config_file: options.config_file.clone(),
            candidates: options.candidates.clone(),
            pdf_path: options.pdf_path.clone(),
        }
    }

    /// Resolves the PDF URL.
    ///
    /// # Errors
    ///
    /// Returns [`KioskError::ResourceNotFound`] describing the strategy that
    /// ran out of options.
    pub async fn resolve<P: ResourceProbe>(&self, probe: &P) -> Result<String, KioskError> {
        match self.mode {
            DiscoveryMode::Explicit => match self.pdf_path.as_deref() {
                Some(path) if !path.trim().is_empty() => Ok(path.to_string()),
                _ => Err(KioskError::ResourceNotFound(
                    "no PDF path configured for explicit discovery.".into(),
                )),
            },
            DiscoveryMode::Config => self.resolve_config(probe).await.map_err(|reason| {
                KioskError::ResourceNotFound(format!(
                    "{} Please ensure {} exists with {{\"pdfFile\": \"yourfile.pdf\"}}",
                    reason,
                    self.config_url()
                ))
            }),
            DiscoveryMode::ConfigWithFallback => match self.resolve_config(probe).await {
                Ok(url) => Ok(url),
                Err(reason) => {
                    info!("{} Probing candidate files instead.", reason);
                    self.probe_candidates(probe).await
                }
            },
            DiscoveryMode::Candidates => self.probe_candidates(probe).await,
        }
    }

    fn config_url(&self) -> String {
        join_asset(&self.assets_folder, &self.config_file)
    }

    /// Reads the discovery record and checks the PDF it names.
    /// The error is a human-readable reason.
    async fn resolve_config<P: ResourceProbe>(&self, probe: &P) -> Result<String, String> {
        let config_url = self.config_url();
        let Some(body) = probe.fetch_text(&config_url).await else {
            return Err(format!("{} not found in assets folder.", self.config_file));
        };
        let config: AssetConfig = serde_json::from_str(&body)
            .map_err(|e| format!("{} is not valid JSON: {}.", self.config_file, e))?;
        let pdf_file = match config.pdf_file {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                return Err(format!(
                    "{} is missing \"pdfFile\" property.",
                    self.config_file
                ));
            }
        };
        let pdf_url = join_asset(&self.assets_folder, &pdf_file);
        if probe.exists(&pdf_url).await {
            Ok(pdf_url)
        } else {
            Err(format!(
                "PDF file \"{}\" specified in {} was not found in assets folder.",
                pdf_file, self.config_file
            ))
        }
    }

    /// Probes every candidate in order; fails only once all are exhausted.
    async fn probe_candidates<P: ResourceProbe>(&self, probe: &P) -> Result<String, KioskError> {
        for name in &self.candidates {
            let url = join_asset(&self.assets_folder, name);
            if probe.exists(&url).await {
                return Ok(url);
            }
            debug!("candidate {} not found", url);
        }
        Err(KioskError::ResourceNotFound(format!(
            "none of the candidate files [{}] exist in {}.",
            self.candidates.join(", "),
            self.assets_folder
        )))
    }
}

/// Joins a folder and a relative name with exactly one `/` between them.
pub fn join_asset(folder: &str, name: &str) -> String {
    let name = name.trim_start_matches('/');
    if folder.is_empty() {
        name.to_string()
    } else if folder.ends_with('/') {
        format!("{}{}", folder, name)
    } else {
        format!("{}/{}", folder, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeProbe {
        files: HashMap<String, String>,
        probed: RefCell<Vec<String>>,
    }

    impl FakeProbe {
        fn with(files: &[(&str, &str)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                probed: RefCell::new(Vec::new()),
            }
        }
    }

    impl ResourceProbe for FakeProbe {
        async fn exists(&self, url: &str) -> bool {
            self.probed.borrow_mut().push(url.to_string());
            self.files.contains_key(url)
        }

        async fn fetch_text(&self, url: &str) -> Option<String> {
            self.probed.borrow_mut().push(url.to_string());
            self.files.get(url).cloned()
        }
    }

    fn discovery(mode: DiscoveryMode, candidates: &[&str]) -> Discovery {
        let options = KioskOptions {
            discovery: mode,
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            ..KioskOptions::default()
        };
        Discovery::from_options(&options)
    }

    #[test]
    fn test_join_asset() {
        assert_eq!(join_asset("assets/", "a.pdf"), "assets/a.pdf");
        assert_eq!(join_asset("assets", "a.pdf"), "assets/a.pdf");
        assert_eq!(join_asset("assets/", "/a.pdf"), "assets/a.pdf");
        assert_eq!(join_asset("", "a.pdf"), "a.pdf");
    }

    #[test]
    fn test_candidates_exhausted_after_probing_all() {
        let probe = FakeProbe::default();
        let result = pollster::block_on(
            discovery(DiscoveryMode::Candidates, &["a.pdf", "b.pdf"]).resolve(&probe),
        );
        assert!(matches!(result, Err(KioskError::ResourceNotFound(_))));
        assert_eq!(
            *probe.probed.borrow(),
            vec!["assets/a.pdf".to_string(), "assets/b.pdf".to_string()]
        );
    }

    #[test]
    fn test_candidates_stop_at_first_hit() {
        let probe = FakeProbe::with(&[("assets/b.pdf", ""), ("assets/c.pdf", "")]);
        let result = pollster::block_on(
            discovery(DiscoveryMode::Candidates, &["a.pdf", "b.pdf", "c.pdf"]).resolve(&probe),
        );
        assert_eq!(result, Ok("assets/b.pdf".to_string()));
        assert_eq!(probe.probed.borrow().len(), 2);
    }

    #[test]
    fn test_empty_candidate_list() {
        let probe = FakeProbe::default();
        let result = pollster::block_on(discovery(DiscoveryMode::Candidates, &[]).resolve(&probe));
        assert!(matches!(result, Err(KioskError::ResourceNotFound(_))));
        assert!(probe.probed.borrow().is_empty());
    }

    #[test]
    fn test_config_resolves_named_pdf() {
        let probe = FakeProbe::with(&[
            ("assets/config.json", r#"{"pdfFile":"show.pdf"}"#),
            ("assets/show.pdf", ""),
        ]);
        let result = pollster::block_on(discovery(DiscoveryMode::Config, &[]).resolve(&probe));
        assert_eq!(result, Ok("assets/show.pdf".to_string()));
    }

    #[test]
    fn test_strict_config_errors() {
        let cases: [(&[(&str, &str)], &str); 4] = [
            (&[], "config.json not found"),
            (&[("assets/config.json", "{oops")], "not valid JSON"),
            (&[("assets/config.json", "{}")], "missing \"pdfFile\""),
            (
                &[("assets/config.json", r#"{"pdfFile":"gone.pdf"}"#)],
                "\"gone.pdf\" specified in config.json was not found",
            ),
        ];
        for (files, expected) in cases {
            let probe = FakeProbe::with(files);
            let err =
                pollster::block_on(discovery(DiscoveryMode::Config, &["a.pdf"]).resolve(&probe))
                    .unwrap_err();
            let message = err.to_string();
            assert!(message.contains(expected), "{message}");
            assert!(message.contains("Please ensure assets/config.json exists"));
        }
    }

    #[test]
    fn test_config_with_fallback_uses_candidates() {
        let probe = FakeProbe::with(&[("assets/config.json", "{}"), ("assets/b.pdf", "")]);
        let result = pollster::block_on(
            discovery(DiscoveryMode::ConfigWithFallback, &["a.pdf", "b.pdf"]).resolve(&probe),
        );
        assert_eq!(result, Ok("assets/b.pdf".to_string()));
    }

    #[test]
    fn test_explicit_skips_probing() {
        let options = KioskOptions {
            discovery: DiscoveryMode::Explicit,
            pdf_path: Some("/media/deck.pdf".into()),
            ..KioskOptions::default()
        };
        let probe = FakeProbe::default();
        let result = pollster::block_on(Discovery::from_options(&options).resolve(&probe));
        assert_eq!(result, Ok("/media/deck.pdf".to_string()));
        assert!(probe.probed.borrow().is_empty());
    }
}
