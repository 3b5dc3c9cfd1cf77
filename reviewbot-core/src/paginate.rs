//! Splitting review text into chat-sized pages
//!
//! Lengths are counted in characters, not bytes: chat platforms limit message
//! bodies by character count and review text is often not ASCII.

use serde::Serialize;

/// One page of a paginated message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageChunk {
    pub body: String,
    /// 1-based position
    pub index: usize,
    pub total: usize,
}

impl MessageChunk {
    /// Whether this message is split over several pages
    pub fn is_paged(&self) -> bool {
        self.total > 1
    }
}

/// Split `text` into pages of at most `max_len` characters.
///
/// Pages break at the last newline that keeps the page within budget, and the
/// newline itself is consumed. A line longer than the budget is cut hard at
/// `max_len` characters and the whitespace at the start of the remainder is
/// dropped. Joining the pages with `\n` gives back `text` whenever no hard cut
/// was needed.
pub fn paginate(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let mut pages = Vec::new();
    let mut rest = text;
    let mut after_hard_cut = false;

    // the char at index `max_len` exists iff `rest` is longer than the budget
    while let Some(limit) = char_offset(rest, max_len) {
        let newline = if rest[limit..].starts_with('\n') {
            Some(limit)
        } else {
            rest[..limit].rfind('\n')
        };

        match newline.filter(|&pos| pos > 0) {
            Some(pos) => {
                pages.push(rest[..pos].to_string());
                rest = &rest[pos + 1..];
                after_hard_cut = false;
            }
            None => {
                pages.push(rest[..limit].to_string());
                rest = rest[limit..].trim_start();
                after_hard_cut = true;
            }
        }
    }

    if !(after_hard_cut && rest.is_empty()) {
        pages.push(rest.to_string());
    }

    pages
}

/// Number the pages produced by [`paginate`]
pub fn into_chunks(pages: Vec<String>) -> Vec<MessageChunk> {
    let total = pages.len();
    pages
        .into_iter()
        .enumerate()
        .map(|(i, body)| MessageChunk {
            body,
            index: i + 1,
            total,
        })
        .collect()
}

/// Byte offset of the char at index `n`, if there is one
fn char_offset(s: &str, n: usize) -> Option<usize> {
    s.char_indices().nth(n).map(|(offset, _)| offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_len(s: &str) -> usize {
        s.chars().count()
    }

    #[test]
    fn test_short_text_is_single_page() {
        assert_eq!(paginate("hello", 1900), vec!["hello"]);
        assert_eq!(paginate("", 1900), vec![""]);
        let exact = "a".repeat(1900);
        assert_eq!(paginate(&exact, 1900), vec![exact.clone()]);
    }

    #[test]
    fn test_review_sized_text() {
        let line = "x".repeat(79);
        let text = vec![line; 63].join("\n");
        assert!(char_len(&text) > 5000);

        let pages = paginate(&text, 1900);
        assert_eq!(pages.len(), 3);
        for page in &pages {
            assert!(char_len(page) <= 1900);
            assert!(!page.ends_with('\n'));
        }
        assert_eq!(pages.join("\n"), text);
    }

    #[test]
    fn test_breaks_at_last_newline() {
        let pages = paginate("aaa\nbbb\nccc", 8);
        assert_eq!(pages, vec!["aaa\nbbb", "ccc"]);
    }

    #[test]
    fn test_newline_exactly_at_budget() {
        let pages = paginate("abcd\nefgh", 4);
        assert_eq!(pages, vec!["abcd", "efgh"]);
    }

    #[test]
    fn test_hard_cut_long_line() {
        let text = "a".repeat(25);
        let pages = paginate(&text, 10);
        assert_eq!(pages, vec!["a".repeat(10), "a".repeat(10), "a".repeat(5)]);
    }

    #[test]
    fn test_hard_cut_collapses_whitespace() {
        let pages = paginate("0123456789   tail", 10);
        assert_eq!(pages, vec!["0123456789", "tail"]);

        // nothing but whitespace after the cut
        let pages = paginate("0123456789   ", 10);
        assert_eq!(pages, vec!["0123456789"]);
    }

    #[test]
    fn test_leading_newline_is_not_a_break() {
        let text = format!("\n{}", "b".repeat(12));
        let pages = paginate(&text, 10);
        assert!(pages.iter().all(|p| !p.is_empty()));
        assert!(pages.iter().all(|p| char_len(p) <= 10));
    }

    #[test]
    fn test_indentation_survives_line_breaks() {
        let text = "fn main() {\n    let x = 1;\n    let y = 2;\n}";
        let pages = paginate(text, 16);
        assert!(pages.iter().any(|p| p.starts_with("    ")));
        assert_eq!(pages.join("\n"), text);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let text = "가".repeat(30);
        let pages = paginate(&text, 10);
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|p| char_len(p) == 10));

        let text = "변경사항 요약\n좋은 점\n개선 제안";
        assert_eq!(paginate(text, 12), vec!["변경사항 요약\n좋은 점", "개선 제안"]);
    }

    #[test]
    fn test_every_page_within_budget() {
        let samples = [
            "a\nbb\nccc\ndddd\neeeee\n".repeat(40),
            "no newlines at all ".repeat(30),
            "\n\n\n".repeat(20),
            "mixed 한글 text\n  indented\n\tTab\n".repeat(25),
        ];

        for text in &samples {
            for max_len in [1, 2, 3, 7, 50, 199, 2000] {
                let pages = paginate(text, max_len);
                assert!(!pages.is_empty());
                for page in &pages {
                    assert!(
                        char_len(page) <= max_len,
                        "page of {} chars over budget {max_len}",
                        char_len(page)
                    );
                }
            }
        }
    }

    #[test]
    fn test_line_aligned_split_round_trips() {
        let text = "first line\nsecond line\nthird\nfourth line\nfifth".to_string();
        for max_len in [11, 12, 20, 30] {
            assert_eq!(paginate(&text, max_len).join("\n"), text, "max_len {max_len}");
        }
    }

    #[test]
    fn test_zero_budget_is_clamped() {
        let pages = paginate("abc", 0);
        assert_eq!(pages, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_into_chunks() {
        let chunks = into_chunks(vec!["one".to_string(), "two".to_string()]);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].index, 1);
        assert_eq!(chunks[1].index, 2);
        assert!(chunks.iter().all(|c| c.total == 2 && c.is_paged()));

        let single = into_chunks(vec!["only".to_string()]);
        assert!(!single[0].is_paged());
    }
}
