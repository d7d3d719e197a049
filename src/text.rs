//! Text normalization shared by the indexer, query analyzer and retrieval engine.

/// Collapses whitespace runs to a single space, drops ASCII control
/// characters (U+0000–U+001F) and trims both ends.
///
/// Whitespace is collapsed before control characters are removed, so a tab or
/// newline becomes a space while other control bytes simply disappear.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if (c as u32) < 0x20 {
            continue;
        }
        out.push(c);
    }

    // A dropped control character can leave a flushed space at either end.
    out.trim().to_string()
}
