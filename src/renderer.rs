//! # Page Renderer
//!
//! Rasterizes every page, one at a time, in increasing index order. Each
//! page is mounted before it is drawn and fully drawn before the next one
//! starts, so at most one rasterization is in flight.
//!
//! The first failure aborts the run with [`KioskError::RenderFailure`];
//! pages already mounted are left for the caller to discard.

use crate::dom::{self, dom_error};
use crate::pdfjs_bindings::{
    get_page, js_error_message, page_viewport_height, page_viewport_width, render_page,
    PdfDocumentHandle, PdfPageHandle,
};
use crate::schema::KioskError;
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlElement};

/// A mounted, fully drawn page.
#[derive(Debug, Clone)]
pub struct RenderedPage<S> {
    pub index: usize,
    pub surface: S,
}

/// Something that can mount and draw pages by index.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    type Surface;

    fn page_count(&self) -> usize;

    /// Mounts page `index` and draws it at `scale`, resolving once drawing
    /// has finished. The error is the library's reason.
    async fn render_page(&self, index: usize, scale: f64) -> Result<Self::Surface, String>;
}

/// Renders every page of `source` sequentially.
pub async fn render_all<S: PageSource>(
    source: &S,
    scale: f64,
) -> Result<Vec<RenderedPage<S::Surface>>, KioskError> {
    let count = source.page_count();
    let mut pages = Vec::with_capacity(count);
    for index in 0..count {
        let surface = source
            .render_page(index, scale)
            .await
            .map_err(|reason| KioskError::RenderFailure {
                page: index,
                reason,
            })?;
        debug!("rendered page {}/{}", index + 1, count);
        pages.push(RenderedPage { index, surface });
    }
    Ok(pages)
}

/// PDF.js pages drawn into canvases inside the slides wrapper.
///
/// Each page becomes `<div class="pdf-page" data-page="N"><canvas/></div>`
/// with `N` 1-based.
pub struct PdfJsPages<'a> {
    document: &'a PdfDocumentHandle,
    page_count: usize,
    wrapper: &'a HtmlElement,
    dom: &'a Document,
}

impl<'a> PdfJsPages<'a> {
    pub fn new(
        document: &'a PdfDocumentHandle,
        page_count: usize,
        wrapper: &'a HtmlElement,
        dom: &'a Document,
    ) -> Self {
        Self {
            document,
            page_count,
            wrapper,
            dom,
        }
    }

    fn mount(
        &self,
        index: usize,
        width: f64,
        height: f64,
    ) -> Result<(HtmlElement, HtmlCanvasElement), KioskError> {
        let canvas: HtmlCanvasElement = dom::create_element(self.dom, "canvas")?;
        canvas.set_width(width.floor() as u32);
        canvas.set_height(height.floor() as u32);

        let page_div: HtmlElement = dom::create_element(self.dom, "div")?;
        page_div.set_class_name("pdf-page");
        page_div
            .set_attribute("data-page", &(index + 1).to_string())
            .map_err(dom_error)?;
        page_div.append_child(&canvas).map_err(dom_error)?;
        self.wrapper.append_child(&page_div).map_err(dom_error)?;
        Ok((page_div, canvas))
    }
}

impl PageSource for PdfJsPages<'_> {
    type Surface = HtmlElement;

    fn page_count(&self) -> usize {
        self.page_count
    }

    async fn render_page(&self, index: usize, scale: f64) -> Result<HtmlElement, String> {
        let page = get_page(self.document, index as u32 + 1)
            .await
            .map_err(|e| js_error_message(&e))?
            .unchecked_into::<PdfPageHandle>();
        let width = page_viewport_width(&page, scale);
        let height = page_viewport_height(&page, scale);

        let (page_div, canvas) = self
            .mount(index, width, height)
            .map_err(|e| e.to_string())?;
        render_page(&page, &canvas, scale)
            .await
            .map_err(|e| js_error_message(&e))?;
        Ok(page_div)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakePages {
        count: usize,
        fail_at: Option<usize>,
        calls: RefCell<Vec<(usize, f64)>>,
    }

    impl FakePages {
        fn new(count: usize, fail_at: Option<usize>) -> Self {
            Self {
                count,
                fail_at,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageSource for FakePages {
        type Surface = String;

        fn page_count(&self) -> usize {
            self.count
        }

        async fn render_page(&self, index: usize, scale: f64) -> Result<String, String> {
            self.calls.borrow_mut().push((index, scale));
            if self.fail_at == Some(index) {
                return Err("bad xref".into());
            }
            Ok(format!("page-{}", index))
        }
    }

    #[test]
    fn test_renders_in_order() {
        let source = FakePages::new(3, None);
        let pages = pollster::block_on(render_all(&source, 2.0)).unwrap();
        let indices: Vec<usize> = pages.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(pages[2].surface, "page-2");
        assert!(source.calls.borrow().iter().all(|(_, scale)| *scale == 2.0));
    }

    #[test]
    fn test_failure_aborts_remaining_pages() {
        let source = FakePages::new(5, Some(2));
        let err = pollster::block_on(render_all(&source, 1.5)).unwrap_err();
        assert_eq!(
            err,
            KioskError::RenderFailure {
                page: 2,
                reason: "bad xref".into()
            }
        );
        let attempted: Vec<usize> = source.calls.borrow().iter().map(|(i, _)| *i).collect();
        assert_eq!(attempted, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_source() {
        let source = FakePages::new(0, None);
        assert!(pollster::block_on(render_all(&source, 2.0)).unwrap().is_empty());
    }
}
