//! JavaScript bindings for PDF.js
//!
//! PDF.js does all the parsing and rasterization. This module exposes the
//! handful of calls the slideshow needs through `pdfjs_bridge.js`, which
//! expects the host page to have loaded PDF.js as `globalThis.pdfjsLib`.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

#[wasm_bindgen(module = "/pdfjs_bridge.js")]
extern "C" {
    /// A loaded `PDFDocumentProxy`.
    pub type PdfDocumentHandle;

    /// A `PDFPageProxy` obtained from a document.
    pub type PdfPageHandle;

    /// Points PDF.js at its worker script.
    #[wasm_bindgen(catch)]
    pub fn configure_worker(worker_src: &str) -> Result<(), JsValue>;

    /// Resolves to a `PdfDocumentHandle`; rejects on a missing or invalid file.
    #[wasm_bindgen(catch)]
    pub async fn load_document(url: &str) -> Result<JsValue, JsValue>;

    pub fn document_page_count(document: &PdfDocumentHandle) -> u32;

    /// Resolves to a `PdfPageHandle`. `page_number` is 1-based.
    #[wasm_bindgen(catch)]
    pub async fn get_page(
        document: &PdfDocumentHandle,
        page_number: u32,
    ) -> Result<JsValue, JsValue>;

    /// Viewport width in pixels at `scale`.
    pub fn page_viewport_width(page: &PdfPageHandle, scale: f64) -> f64;

    /// Viewport height in pixels at `scale`.
    pub fn page_viewport_height(page: &PdfPageHandle, scale: f64) -> f64;

    /// Draws the page into `canvas`, which must already be sized to the viewport.
    #[wasm_bindgen(catch)]
    pub async fn render_page(
        page: &PdfPageHandle,
        canvas: &HtmlCanvasElement,
        scale: f64,
    ) -> Result<JsValue, JsValue>;
}

/// Readable message for a rejected promise or thrown value.
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Loads a document and returns it with its page count.
pub async fn open_document(url: &str) -> Result<(PdfDocumentHandle, usize), String> {
    let handle = load_document(url)
        .await
        .map_err(|e| js_error_message(&e))?
        .unchecked_into::<PdfDocumentHandle>();
    let count = document_page_count(&handle) as usize;
    Ok((handle, count))
}
