//! Delta selection: picks the streamed text out of each decoded frame.

use crate::types::Fragment;
use crate::{BoxStream, Error, PipeResult};
use futures::StreamExt;
use serde_json::Value;

/// Text carried by one OpenAI-style chunk (`choices[0].delta.content`).
///
/// Returns `Ok(None)` for frames without text (role announcements, finish markers, usage
/// frames) and `Err` for in-band `{"error": ...}` frames.
pub fn delta_text(frame: &Value) -> PipeResult<Option<String>> {
    if let Some(err) = frame.get("error") {
        return Err(Error::from_provider_value(None, err));
    }
    let text = frame
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("delta"))
        .and_then(|d| d.get("content"))
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string());
    Ok(text)
}

/// Filter a frame stream down to numbered, non-empty fragments. Errors pass through.
pub fn select_fragments(input: BoxStream<'static, Value>) -> BoxStream<'static, Fragment> {
    let stream = input
        .filter_map(|result| async move {
            match result {
                Ok(frame) => delta_text(&frame).transpose(),
                Err(e) => Some(Err(e)), // Propagate errors
            }
        })
        .enumerate()
        .map(|(i, r)| {
            r.map(|text| Fragment {
                text,
                sequence_id: i as u64,
            })
        });
    Box::pin(stream)
}
