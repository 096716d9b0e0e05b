use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

use content_critic::{
    Document, HighlightDescriptor, HighlightSetManager, MonospaceLayout, RenderMode, Viewport,
};
use critic_analysis::{CriticPrompt, PromptOptions};

// ============================================================================
// HIGHLIGHT API
// ============================================================================

/// One overlay rectangle, in document coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasmRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Result of applying a highlight batch to markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightResult {
    /// The body markup with inline markers applied.
    pub markup: String,
    /// How many spans actually rendered.
    pub rendered: usize,
    /// How many descriptors were in the batch.
    pub requested: usize,
}

/// Result of overlay-mode anchoring: geometry only, markup untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayResult {
    pub rendered: usize,
    pub boxes: Vec<WasmOverlayBox>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasmOverlayBox {
    pub category: String,
    pub visible: bool,
    pub rects: Vec<WasmRect>,
}

fn parse_descriptors(json: &str) -> Result<Vec<HighlightDescriptor>, String> {
    serde_json::from_str(json).map_err(|e| format!("bad descriptor JSON: {}", e))
}

fn demo_manager(mode: RenderMode) -> HighlightSetManager<MonospaceLayout> {
    HighlightSetManager::new(MonospaceLayout::default(), Viewport::new(1024.0, 768.0))
        .with_mode(mode)
}

/// Apply a highlight batch (JSON array of descriptors) to body markup and
/// return the marked-up result.
///
/// Descriptor shape: `{"text": ..., "type": ..., "explanation": ...,
/// "suggestion": ...}` with type one of
/// fluff|fallacy|assumption|contradiction|inconsistency.
#[wasm_bindgen]
pub fn apply_highlights(markup: &str, descriptors_json: &str) -> JsValue {
    init();
    let result = apply_highlights_internal(markup, descriptors_json);
    match result {
        Ok(result) => serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL),
        Err(_) => JsValue::NULL,
    }
}

fn apply_highlights_internal(
    markup: &str,
    descriptors_json: &str,
) -> Result<HighlightResult, String> {
    let descriptors = parse_descriptors(descriptors_json)?;
    let requested = descriptors.len();
    let mut doc = Document::from_body_markup(markup).map_err(|e| e.to_string())?;
    let mut mgr = demo_manager(RenderMode::Inline);
    let rendered = mgr.apply(&mut doc, descriptors);
    Ok(HighlightResult {
        markup: doc.body_markup(),
        rendered,
        requested,
    })
}

/// Anchor a highlight batch in overlay mode and return box geometry from the
/// demo's monospace layout, leaving the markup untouched.
#[wasm_bindgen]
pub fn overlay_highlights(markup: &str, descriptors_json: &str) -> JsValue {
    init();
    match overlay_highlights_internal(markup, descriptors_json) {
        Ok(result) => serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL),
        Err(_) => JsValue::NULL,
    }
}

fn overlay_highlights_internal(
    markup: &str,
    descriptors_json: &str,
) -> Result<OverlayResult, String> {
    let descriptors = parse_descriptors(descriptors_json)?;
    let mut doc = Document::from_body_markup(markup).map_err(|e| e.to_string())?;

    let layout = MonospaceLayout::default();
    let mut layer = content_critic::OverlayLayer::new();
    let mut rendered = 0;
    for (instance, d) in descriptors.iter().enumerate() {
        rendered += layer.add(&mut doc, &layout, &d.text, d.category, instance);
    }

    let boxes = layer
        .boxes()
        .iter()
        .map(|b| WasmOverlayBox {
            category: b.category.as_str().to_string(),
            visible: b.visible,
            rects: b
                .rects
                .iter()
                .map(|r| WasmRect {
                    x: r.x,
                    y: r.y,
                    width: r.width,
                    height: r.height,
                })
                .collect(),
        })
        .collect();

    Ok(OverlayResult { rendered, boxes })
}

/// Parse a raw model critique reply and return the highlight batch it
/// carries, ready to feed into `apply_highlights`.
#[wasm_bindgen]
pub fn parse_critique(raw_reply: &str) -> JsValue {
    init();
    let prompt = CriticPrompt::new(PromptOptions::default());
    match prompt.parse(raw_reply) {
        Ok(critique) => serde_wasm_bindgen::to_value(&critique.highlights).unwrap_or(JsValue::NULL),
        Err(_) => JsValue::NULL,
    }
}

/// Render the critique prompt for a piece of content (for demo inspection).
#[wasm_bindgen]
pub fn critique_prompt(content: &str) -> String {
    CriticPrompt::new(PromptOptions::default()).render(content)
}
