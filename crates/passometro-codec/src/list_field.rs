//! Edit transform for list-type fields (labs, blood gas).
//!
//! Editing works on raw lines. Highlight tables are discarded on the way in and every saved line
//! becomes a plain item, so emphasis is reset whenever one of these fields is edited and saved.
//! The generator is the only source of highlights; they are not reconstructed here.

use crate::TaggedItem;

/// One line per item, highlights discarded.
pub fn to_edit_text(items: &[TaggedItem]) -> String {
    items
        .iter()
        .map(|item| item.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// One plain item per line. Lines are kept verbatim apart from a trailing carriage return;
/// blank lines become blank items, which the renderer omits.
pub fn from_edit_text(text: &str) -> Vec<TaggedItem> {
    text.split('\n')
        .map(|line| TaggedItem::plain(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_text_discards_highlights() {
        let items = vec![
            TaggedItem::plain("Hb: 9.1 | Leuco: 14.200").with_highlight("14.200", "alert"),
            TaggedItem::plain("Cr: 2.3").with_highlight("2.3", "warn"),
        ];
        assert_eq!(to_edit_text(&items), "Hb: 9.1 | Leuco: 14.200\nCr: 2.3");
    }

    #[test]
    fn test_saved_items_have_no_highlights() {
        let items = from_edit_text("pH: 7.31\r\npCO2: 48 | HCO3: 22\n\nLac: 3.4");
        assert_eq!(items.len(), 4);
        assert!(items.iter().all(|item| item.highlights.is_empty()));
        assert_eq!(items[0].text, "pH: 7.31");
        assert_eq!(items[1].text, "pCO2: 48 | HCO3: 22");
        assert!(items[2].is_blank());
    }

    #[test]
    fn test_edit_round_trip_preserves_text() {
        let original = vec![
            TaggedItem::plain("Na: 131").with_highlight("131", "warn"),
            TaggedItem::plain("K: 4.1"),
        ];
        let saved = from_edit_text(&to_edit_text(&original));
        let texts: Vec<_> = saved.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["Na: 131", "K: 4.1"]);
        assert_ne!(saved, original);
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(to_edit_text(&[]), "");
        assert_eq!(from_edit_text(""), vec![TaggedItem::plain("")]);
    }
}
