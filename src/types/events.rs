//! Streaming increments.

use serde::{Deserialize, Serialize};

/// A chunk of generated text from one streaming increment.
///
/// May span several rendering units (characters). Fragments are only produced for
/// increments that carry non-empty text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    /// Zero-based position of this fragment within its stream.
    pub sequence_id: u64,
}

impl Fragment {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of rendering units the pacing queue will emit for this fragment.
    pub fn rendering_units(&self) -> usize {
        self.text.chars().count()
    }
}
