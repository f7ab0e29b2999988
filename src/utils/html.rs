use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based: safe tags (like <b>, <p>) survive, dangerous tags
/// (<script>, <iframe>) and attributes (onclick) are stripped.
///
/// Applied to free text that other users see (quiz names, profile blurbs).
/// Never applied to answer options, which are compared byte for byte.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Text left after every tag is stripped. Script and style bodies are dropped.
pub fn visible_text(input: &str) -> String {
    ammonia::Builder::empty().clean(input).to_string()
}
