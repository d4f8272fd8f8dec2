//! Kiosk-mode PDF slideshow for the browser.
//!
//! The host page loads PDF.js (as `globalThis.pdfjsLib`), initializes this
//! module and calls `start_kiosk`:
//!
//! ```javascript
//! import init, { start_kiosk } from './pkg/pdf_kiosk_wasm.js';
//!
//! await init();
//! const pages = await start_kiosk(JSON.stringify({ discovery: "config" }));
//! ```

mod discovery;
mod dom;
mod indicator;
mod input;
mod loader;
mod logging;
mod navigation;
mod pdfjs_bindings;
mod renderer;
mod schema;
mod viewer;

use std::cell::RefCell;

use log::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use schema::{KioskError, KioskOptions};
use viewer::KioskSession;

thread_local! {
    static SESSION: RefCell<Option<KioskSession>> = const { RefCell::new(None) };
}

/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

fn to_js(err: KioskError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Loads the PDF, renders every page and starts listening for input.
///
/// `options_json` is an optional JSON object matching `KioskOptions`;
/// malformed JSON falls back to the defaults. Resolves to the page count.
///
/// On failure the content container shows the error and the promise
/// rejects with the same message. A failed start is final until reload.
#[wasm_bindgen]
pub async fn start_kiosk(options_json: Option<String>) -> Result<u32, JsValue> {
    // a restart replaces the previous session and its listeners
    SESSION.with(|s| s.borrow_mut().take());

    let options = KioskOptions::from_json(options_json.as_deref());
    log::set_max_level(options.log_filter());

    let document = dom::document().map_err(to_js)?;
    let container: HtmlElement =
        dom::element_by_id(&document, &options.container_id).map_err(to_js)?;
    dom::show_loading(&document, &container).map_err(to_js)?;

    match KioskSession::start(options, &document, &container).await {
        Ok(session) => {
            let count = session.page_count() as u32;
            SESSION.with(|s| *s.borrow_mut() = Some(session));
            Ok(count)
        }
        Err(err) => {
            error!("Error loading PDF: {}", err);
            if let Err(display_err) = dom::show_error(&document, &container, &err.to_string()) {
                warn!("could not display error: {}", display_err);
            }
            Err(to_js(err))
        }
    }
}

/// Moves to `index` (0-based) with the same rules as user input.
/// Returns `false` when no session is running or the request was ignored.
#[wasm_bindgen]
pub fn go_to_page(index: u32) -> bool {
    SESSION.with(|s| {
        s.borrow()
            .as_ref()
            .is_some_and(|session| session.go_to(index as usize))
    })
}

/// Current 0-based page, or `None` before a session has started.
#[wasm_bindgen]
pub fn current_page() -> Option<u32> {
    SESSION.with(|s| s.borrow().as_ref().map(|session| session.current_page() as u32))
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
