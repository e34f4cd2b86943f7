use crate::events::RecognitionResult;

/// Concatenation of the final results in a batch, trimmed. Interim results
/// are ignored; `None` when nothing final was heard.
pub fn final_transcript(results: &[RecognitionResult]) -> Option<String> {
    let joined: String = results
        .iter()
        .filter(|r| r.is_final)
        .map(|r| r.transcript.as_str())
        .collect();
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
