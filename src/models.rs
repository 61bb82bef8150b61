//! Model identifiers offered to the writer.

/// Fast, inexpensive model used for drafting.
pub const GEMINI_FLASH: &str = "gemini-2.5-flash-preview-04-17";

/// Higher-quality model for careful rewrites.
pub const GEMINI_PRO: &str = "gemini-2.5-pro-exp-03-25";

/// Model substituted when a caller does not name one.
pub const DEFAULT_MODEL: &str = GEMINI_FLASH;

/// A selectable model with a display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub label: &'static str,
}

/// Every model the UI may offer, default first.
pub const ALL: &[ModelInfo] = &[
    ModelInfo {
        id: GEMINI_FLASH,
        label: "Gemini Flash",
    },
    ModelInfo {
        id: GEMINI_PRO,
        label: "Gemini Pro",
    },
];

/// Look up a known model by id.
pub fn find(id: &str) -> Option<&'static ModelInfo> {
    ALL.iter().find(|m| m.id == id)
}
