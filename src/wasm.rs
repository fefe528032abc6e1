//! WASM bindings for mathtutor
//!
//! This module exposes the formatting pipeline to a browser front end.
//! Segment and line values cross the boundary as plain JS objects
//! (`{kind: "math", expression: "x^2"}`, `{role: "step-header", segments: [...]}`).

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use serde::Serialize;

#[cfg(feature = "wasm")]
use crate::render::{HtmlRenderer, Renderer};

/// Error payload returned when a value cannot be serialized.
#[cfg(feature = "wasm")]
#[derive(Serialize)]
struct ErrorObject {
    error: String,
}

/// Safely serialize a value to JsValue, returning an error object on failure.
#[cfg(feature = "wasm")]
fn to_js_value<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or_else(|e| {
        let error_obj = ErrorObject {
            error: format!("Serialization error: {}", e),
        };
        serde_wasm_bindgen::to_value(&error_obj).unwrap_or(JsValue::NULL)
    })
}

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Split text into an array of text/math segments.
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "renderMathText")]
pub fn render_math_text_wasm(input: &str) -> JsValue {
    to_js_value(&crate::render_math_text(input))
}

/// Classify and segment a generated solution.
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "formatSolution")]
pub fn format_solution_wasm(input: &str) -> JsValue {
    to_js_value(&crate::format_solution(input))
}

/// Render text to HTML, with math in `<span class="math-inline">`.
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "renderMathTextHtml")]
pub fn render_math_text_html_wasm(input: &str) -> String {
    HtmlRenderer::new().render_segments(&crate::render_math_text(input))
}

/// Render a generated solution to HTML blocks.
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "formatSolutionHtml")]
pub fn format_solution_html_wasm(input: &str) -> String {
    HtmlRenderer::new().render_lines(&crate::format_solution(input))
}

/// Role name for a single line, or `null` for blank lines.
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "classifyLine")]
pub fn classify_line_wasm(line: &str) -> Option<String> {
    crate::core::classify_line(line).map(|c| c.role.name().to_string())
}

/// Get version information
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
