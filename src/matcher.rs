//! Fuzzy display-name matching.

/// Trims surrounding whitespace and folds to lowercase.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Returns true when the normalized `a` contains the normalized `b`, or the
/// other way round.
///
/// Both sides are trimmed and lowercased first. An empty normalized string is
/// a substring of everything, so it matches any input.
///
/// # Examples
///
/// ```rust
/// use reg_appsearch::fuzzy_match;
///
/// assert!(fuzzy_match(" Notepad ", "Notepad++"));
/// assert!(fuzzy_match("VLC media player", "vlc"));
/// assert!(!fuzzy_match("notepad", "vlc"));
/// ```
pub fn fuzzy_match(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    a.contains(b.as_str()) || b.contains(a.as_str())
}

/// Returns true if `name` is the `DisplayName` attribute, ignoring case and
/// surrounding whitespace.
pub fn is_display_name(name: &str) -> bool {
    normalize(name) == normalize(crate::DISPLAY_NAME)
}
