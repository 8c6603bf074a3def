//! Boundary-preserving truncation to a character cap.
//!
//! The result is the longest prefix within the cap that ends at a sentence
//! or clause boundary. Sentence boundaries keep their punctuation; clause
//! boundaries cut just before it. Without any boundary the text is cut at
//! the cap. No ellipsis is added and trailing whitespace is dropped.

use super::audit::BoundaryKind;

/// A truncated text and how it was cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Truncation {
    pub text: String,
    pub boundary: BoundaryKind,
}

/// Truncate `text` (already trimmed) to at most `cap` characters.
pub(crate) fn truncate_at_boundary(text: &str, cap: usize) -> Truncation {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let byte_at = |len: usize| chars.get(len).map_or(text.len(), |&(b, _)| b);
    let ends_clause = |i: usize| chars.get(i + 1).is_none_or(|&(_, c)| c.is_whitespace());

    let mut best: Option<(usize, BoundaryKind)> = None;
    for (i, &(_, c)) in chars.iter().enumerate() {
        if i > cap {
            break;
        }
        let (len, kind) = match c {
            '.' | '!' | '?' if ends_clause(i) => (i + 1, BoundaryKind::Sentence),
            ',' | ';' | ':' if ends_clause(i) => (i, BoundaryKind::Clause),
            '\n' => (i, BoundaryKind::Clause),
            _ => continue,
        };
        if len > cap || text[..byte_at(len)].trim_end().is_empty() {
            continue;
        }
        if best.is_none_or(|(best_len, _)| len > best_len) {
            best = Some((len, kind));
        }
    }

    let (len, boundary) = best.unwrap_or((cap, BoundaryKind::Hard));
    Truncation {
        text: text[..byte_at(len)].trim_end().to_string(),
        boundary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuts_after_last_sentence_within_cap() {
        let t = truncate_at_boundary("First one. Second one! Third one is long", 25);
        assert_eq!(t.text, "First one. Second one!");
        assert_eq!(t.boundary, BoundaryKind::Sentence);
    }

    #[test]
    fn clause_boundary_cuts_before_punctuation() {
        let t = truncate_at_boundary("Warm drinks, cozy seats and more", 20);
        assert_eq!(t.text, "Warm drinks");
        assert_eq!(t.boundary, BoundaryKind::Clause);
    }

    #[test]
    fn longest_boundary_wins() {
        let t = truncate_at_boundary("Short. Then a longer clause, and more words here", 30);
        assert_eq!(t.text, "Short. Then a longer clause");
        assert_eq!(t.boundary, BoundaryKind::Clause);
    }

    #[test]
    fn line_break_is_a_clause_boundary() {
        let t = truncate_at_boundary("Headline here\nBody copy that runs on", 20);
        assert_eq!(t.text, "Headline here");
    }

    #[test]
    fn decimal_point_is_not_a_sentence() {
        let t = truncate_at_boundary("Only 3.50 today for every latte", 12);
        assert_eq!(t.boundary, BoundaryKind::Hard);
        assert_eq!(t.text, "Only 3.50 to");
    }

    #[test]
    fn hard_cut_without_boundaries() {
        let text = "a".repeat(300);
        let t = truncate_at_boundary(&text, 280);
        assert_eq!(t.text.chars().count(), 280);
        assert_eq!(t.boundary, BoundaryKind::Hard);
    }

    #[test]
    fn hard_cut_drops_trailing_space() {
        let t = truncate_at_boundary("abcd efgh", 5);
        assert_eq!(t.text, "abcd");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let t = truncate_at_boundary("ééééé ééééé", 6);
        assert_eq!(t.text, "ééééé");
        assert_eq!(t.text.chars().count(), 5);
    }

    #[test]
    fn sentence_ending_exactly_at_cap() {
        let t = truncate_at_boundary("Done here. More", 10);
        assert_eq!(t.text, "Done here.");
        assert_eq!(t.boundary, BoundaryKind::Sentence);
    }
}
