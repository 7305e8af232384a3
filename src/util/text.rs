// src/util/text.rs

/// First non-empty line of a description, shortened to at most `max_chars`
/// characters including the trailing ellipsis.
///
/// # Examples
///
/// ```
/// use cloudnotes::util::text::summarize;
///
/// assert_eq!(summarize("\n  Buy milk  \nand eggs", 40), "Buy milk");
/// assert_eq!(summarize("abcdef", 4), "abc…");
/// ```
pub fn summarize(text: &str, max_chars: usize) -> String {
    let line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    if line.chars().count() <= max_chars {
        return line.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut short: String = line.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}
