//! Small DOM helpers shared by the loader, renderer and session.

use crate::schema::KioskError;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement, Window};

pub fn window() -> Result<Window, KioskError> {
    web_sys::window().ok_or_else(|| KioskError::Dom("no window available".into()))
}

pub fn document() -> Result<Document, KioskError> {
    window()?
        .document()
        .ok_or_else(|| KioskError::Dom("no document available".into()))
}

/// Converts a thrown DOM exception into [`KioskError::Dom`].
pub fn dom_error(value: JsValue) -> KioskError {
    KioskError::Dom(crate::pdfjs_bindings::js_error_message(&value))
}

/// Looks up a required element by id.
pub fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, KioskError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| KioskError::Dom(format!("element #{} not found", id)))?
        .dyn_into::<T>()
        .map_err(|_| KioskError::Dom(format!("element #{} has an unexpected type", id)))
}

/// Looks up an optional element by id; absent or mistyped yields `None`.
pub fn optional_element<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document.get_element_by_id(id)?.dyn_into::<T>().ok()
}

pub fn create_element<T: JsCast>(document: &Document, tag: &str) -> Result<T, KioskError> {
    document
        .create_element(tag)
        .map_err(dom_error)?
        .dyn_into::<T>()
        .map_err(|_| KioskError::Dom(format!("<{}> is not the expected element type", tag)))
}

/// Removes every child of `element`.
pub fn clear(element: &HtmlElement) {
    element.set_text_content(None);
}

/// Replaces `container` content with a single `<div class=…>` holding `text`.
fn replace_with_message(
    document: &Document,
    container: &HtmlElement,
    class_name: &str,
    text: &str,
) -> Result<(), KioskError> {
    let message: HtmlElement = create_element(document, "div")?;
    message.set_class_name(class_name);
    message.set_text_content(Some(text));
    clear(container);
    container.append_child(&message).map_err(dom_error)?;
    Ok(())
}

pub fn show_loading(document: &Document, container: &HtmlElement) -> Result<(), KioskError> {
    replace_with_message(document, container, "loading", "Loading PDF...")
}

pub fn show_error(
    document: &Document,
    container: &HtmlElement,
    reason: &str,
) -> Result<(), KioskError> {
    replace_with_message(
        document,
        container,
        "error-message",
        &format!("Error loading PDF: {}", reason),
    )
}

/// Viewport width in CSS pixels, `0.0` when unavailable.
pub fn viewport_width() -> f64 {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|w| w.as_f64())
        .unwrap_or(0.0)
}
