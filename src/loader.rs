//! Document loading: discovery over `fetch`, then PDF.js.

use crate::discovery::{Discovery, ResourceProbe};
use crate::dom;
use crate::pdfjs_bindings::{configure_worker, js_error_message, open_document, PdfDocumentHandle};
use crate::schema::{KioskError, KioskOptions};
use log::{debug, info};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCache, RequestInit, Response, Window};

/// [`ResourceProbe`] backed by the browser's `fetch`, bypassing the HTTP cache
/// so a kiosk picks up a swapped PDF on reload.
pub struct FetchProbe {
    window: Window,
}

impl FetchProbe {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    async fn request(&self, url: &str, method: &str) -> Option<Response> {
        let init = RequestInit::new();
        init.set_method(method);
        init.set_cache(RequestCache::NoCache);
        let request = Request::new_with_str_and_init(url, &init).ok()?;
        let response = match JsFuture::from(self.window.fetch_with_request(&request)).await {
            Ok(value) => value.dyn_into::<Response>().ok()?,
            Err(err) => {
                debug!("{} {} failed: {}", method, url, js_error_message(&err));
                return None;
            }
        };
        response.ok().then_some(response)
    }
}

impl ResourceProbe for FetchProbe {
    async fn exists(&self, url: &str) -> bool {
        self.request(url, "HEAD").await.is_some()
    }

    async fn fetch_text(&self, url: &str) -> Option<String> {
        let response = self.request(url, "GET").await?;
        JsFuture::from(response.text().ok()?).await.ok()?.as_string()
    }
}

/// A document accepted by PDF.js.
pub struct LoadedDocument {
    pub handle: PdfDocumentHandle,
    pub page_count: usize,
    pub url: String,
}

/// Resolves the PDF location and opens it.
///
/// # Errors
///
/// - [`KioskError::ResourceNotFound`] when discovery is exhausted
/// - [`KioskError::LoadFailure`] when PDF.js rejects the file or it has no pages
pub async fn load(options: &KioskOptions) -> Result<LoadedDocument, KioskError> {
    configure_worker(&options.worker_src)
        .map_err(|e| KioskError::LoadFailure(js_error_message(&e)))?;

    let probe = FetchProbe::new(dom::window()?);
    let url = Discovery::from_options(options).resolve(&probe).await?;
    info!("Loading PDF from: {}", url);

    let (handle, page_count) = open_document(&url)
        .await
        .map_err(KioskError::LoadFailure)?;
    if page_count == 0 {
        return Err(KioskError::LoadFailure(format!("{} has no pages", url)));
    }
    info!("{} opened with {} pages", url, page_count);
    Ok(LoadedDocument {
        handle,
        page_count,
        url,
    })
}
