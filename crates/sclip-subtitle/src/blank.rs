//! Deterministic keyword blanking.

/// Fixed-width placeholder every blanked keyword collapses to, regardless of
/// keyword length: "Hello" becomes "_____".
pub const BLANK_TOKEN: &str = "_____";

/// Replace every whole-word occurrence of each keyword with [`BLANK_TOKEN`].
///
/// Matching is case-sensitive and order-independent across keywords;
/// overlapping keyword spans are resolved leftmost-longest. A given
/// `(text, keywords)` pair always yields the same masked string, and an
/// empty keyword list is a no-op.
pub fn blank_keywords(text: &str, keywords: &[String]) -> String {
    if keywords.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        let matched = if at_word_boundary(text, i) {
            longest_keyword_at(text, i, keywords)
        } else {
            None
        };

        match matched {
            Some(len) => {
                out.push_str(BLANK_TOKEN);
                i += len;
            }
            None => {
                let ch = text[i..].chars().next().expect("i is a char boundary");
                out.push(ch);
                i += ch.len_utf8();
            }
        }
    }
    out
}

fn at_word_boundary(text: &str, i: usize) -> bool {
    match text[..i].chars().next_back() {
        Some(prev) => !prev.is_alphanumeric(),
        None => true,
    }
}

/// Byte length of the longest keyword matching at `i` as a whole word.
fn longest_keyword_at(text: &str, i: usize, keywords: &[String]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for keyword in keywords {
        if keyword.is_empty() || !text[i..].starts_with(keyword.as_str()) {
            continue;
        }
        let end = i + keyword.len();
        let ends_at_boundary = match text[end..].chars().next() {
            Some(next) => !next.is_alphanumeric(),
            None => true,
        };
        if ends_at_boundary && best.map_or(true, |b| keyword.len() > b) {
            best = Some(keyword.len());
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_documented_contract() {
        assert_eq!(blank_keywords("Hello", &kw(&["Hello"])), "_____");
    }

    #[test]
    fn test_scenario_multi_keyword() {
        let text = "Hello world, how are you today?";
        let masked = blank_keywords(text, &kw(&["Hello", "world", "today"]));
        assert_eq!(masked, "_____ _____, how are you _____?");
    }

    #[test]
    fn test_case_sensitive_whole_word() {
        assert_eq!(blank_keywords("hello Hello", &kw(&["Hello"])), "hello _____");
        // "worlds" is not a whole-word occurrence of "world"
        assert_eq!(blank_keywords("worlds apart", &kw(&["world"])), "worlds apart");
    }

    #[test]
    fn test_leftmost_longest_overlap() {
        // "ice cream" wins over "ice" at the same start position
        let masked = blank_keywords("ice cream is cold", &kw(&["ice", "ice cream"]));
        assert_eq!(masked, "_____ is cold");
    }

    #[test]
    fn test_empty_keywords_is_noop_and_idempotent() {
        let text = "Hello world";
        let once = blank_keywords(text, &[]);
        assert_eq!(once, text);
        assert_eq!(blank_keywords(&once, &[]), once);
    }

    #[test]
    fn test_deterministic_across_keyword_order() {
        let text = "one two three";
        let a = blank_keywords(text, &kw(&["one", "three"]));
        let b = blank_keywords(text, &kw(&["three", "one"]));
        assert_eq!(a, b);
        assert_eq!(a, "_____ two _____");
    }

    #[test]
    fn test_multibyte_text_preserved() {
        let masked = blank_keywords("안녕 Hello 세계", &kw(&["Hello"]));
        assert_eq!(masked, "안녕 _____ 세계");
    }
}
