//! Feedback excerpts for drilldown tables

pub const PLACEHOLDER: &str = "...";

/// Excerpt settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcerptOptions {
    /// Texts with more words than this are shortened
    pub max_words: usize,
    /// Maximum width in characters of a shortened text, placeholder included
    pub width: usize,
}

impl Default for ExcerptOptions {
    fn default() -> Self {
        Self {
            max_words: 10,
            width: 100,
        }
    }
}

/// Shorten long feedback for display
///
/// Short texts are returned untouched. Long ones have their whitespace
/// collapsed and are cut on a word boundary so that the words plus
/// `...` fit in `width` characters.
pub fn excerpt(text: &str, options: ExcerptOptions) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= options.max_words {
        return text.to_string();
    }
    shorten(&words, options.width)
}

fn shorten(words: &[&str], width: usize) -> String {
    let collapsed_len = words.iter().map(|w| w.chars().count()).sum::<usize>() + words.len() - 1;
    if collapsed_len <= width {
        return words.join(" ");
    }

    let budget = width.saturating_sub(PLACEHOLDER.len());
    let mut kept = String::new();
    let mut kept_len = 0;
    for word in words {
        let word_len = word.chars().count();
        let needed = if kept.is_empty() { word_len } else { kept_len + 1 + word_len };
        if needed > budget {
            break;
        }
        if !kept.is_empty() {
            kept.push(' ');
        }
        kept.push_str(word);
        kept_len = needed;
    }

    // When not even the first word fits, only the placeholder is left
    kept.push_str(PLACEHOLDER);
    kept
}
