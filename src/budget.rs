use tracing::debug;

pub fn approx_tokens(s: &str) -> usize {
    // heuristic ~4 chars/token
    (s.chars().count() + 3) / 4
}

/// Trim a fragment so it fits the inference model's input window.
/// Cuts on a char boundary, preferring the last whitespace before the cap.
pub fn cap_fragment(text: &str, max_tokens: usize) -> &str {
    if approx_tokens(text) <= max_tokens {
        return text;
    }
    let max_chars = max_tokens * 4;
    let cut = text
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let head = &text[..cut];
    let capped = match head.rfind(char::is_whitespace) {
        Some(ws) if ws > 0 => head[..ws].trim_end(),
        _ => head,
    };
    debug!(
        "Fragment capped - original_tokens={}, capped_tokens={}, max_tokens={}",
        approx_tokens(text),
        approx_tokens(capped),
        max_tokens
    );
    capped
}
