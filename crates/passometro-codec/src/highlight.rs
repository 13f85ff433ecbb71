//! Inline highlighter for tagged items.
//!
//! A tagged item's text is split into display segments (`prefix` + `value`), and each segment's
//! emphasis tag is resolved by an ordered rule list. The first rule whose predicate matches the
//! value picks the lookup key; if the item's highlight table has no entry for that key the
//! segment is shown without emphasis. Later rules are not consulted once one has matched.
//!
//! The clinical rule set is:
//! 1. values mentioning fever (`Febre`, `Subfebril`, any case) look up [`TEMPERATURE_KEY`]
//! 2. everything else looks up the first whitespace-delimited word of the value

use crate::TaggedItem;
use passometro_types::StyleTag;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Highlight key used for temperature findings.
pub const TEMPERATURE_KEY: &str = "TEMPERATURE";

/// Separator between segments inside a tagged item's text.
pub const SEGMENT_SEPARATOR: char = '|';

/// Separator placed between rendered segments.
pub const RENDERED_SEGMENT_SEPARATOR: &str = " | ";

const FEVER_PATTERN: &str = "(?i)febre|subfebril";

fn fever_regex() -> &'static Regex {
    static FEVER: OnceLock<Regex> = OnceLock::new();
    FEVER.get_or_init(|| Regex::new(FEVER_PATTERN).expect("fever pattern is a valid regex"))
}

/// One display fragment of a tagged item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Label including its `": "` suffix, or empty when the segment has no label.
    pub prefix: String,
    pub value: String,
    pub tag: Option<StyleTag>,
}

/// When a rule applies.
#[derive(Clone, Debug)]
pub enum Predicate {
    Always,
    Matches(Regex),
}

impl Predicate {
    fn test(&self, value: &str) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Matches(re) => re.is_match(value),
        }
    }
}

/// Which highlight key a matching rule looks up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeySelector {
    Fixed(String),
    FirstWord,
}

impl KeySelector {
    fn key<'v>(&'v self, value: &'v str) -> &'v str {
        match self {
            KeySelector::Fixed(key) => key,
            KeySelector::FirstWord => value.split_whitespace().next().unwrap_or(""),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HighlightRule {
    pub predicate: Predicate,
    pub key: KeySelector,
}

impl HighlightRule {
    /// Rule that looks up `key` whenever `pattern` matches the segment value.
    pub fn matching(pattern: &str, key: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            predicate: Predicate::Matches(Regex::new(pattern)?),
            key: KeySelector::Fixed(key.into()),
        })
    }

    pub fn first_word() -> Self {
        Self {
            predicate: Predicate::Always,
            key: KeySelector::FirstWord,
        }
    }
}

/// Ordered, first-match-wins rule list.
#[derive(Clone, Debug)]
pub struct HighlightRules {
    rules: Vec<HighlightRule>,
}

impl HighlightRules {
    pub fn new(rules: Vec<HighlightRule>) -> Self {
        Self { rules }
    }

    /// Fever rule followed by the first-word fallback.
    pub fn clinical() -> Self {
        Self::new(vec![
            HighlightRule {
                predicate: Predicate::Matches(fever_regex().clone()),
                key: KeySelector::Fixed(TEMPERATURE_KEY.to_string()),
            },
            HighlightRule::first_word(),
        ])
    }

    /// Adds a rule ahead of the existing ones.
    pub fn prepend(&mut self, rule: HighlightRule) {
        self.rules.insert(0, rule);
    }

    /// Resolves the emphasis tag for one segment value.
    pub fn resolve<'h>(
        &self,
        value: &str,
        highlights: &'h BTreeMap<String, StyleTag>,
    ) -> Option<&'h StyleTag> {
        let rule = self.rules.iter().find(|rule| rule.predicate.test(value))?;
        highlights.get(rule.key.key(value))
    }

    /// Splits an item into display segments and resolves each segment's tag.
    ///
    /// Blank items produce no segments; callers omit them entirely.
    pub fn segments(&self, item: &TaggedItem) -> Vec<Segment> {
        if item.is_blank() {
            return Vec::new();
        }

        item.text
            .split(SEGMENT_SEPARATOR)
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(|piece| {
                let (prefix, value) = split_label(piece);
                let tag = self.resolve(&value, &item.highlights).cloned();
                Segment { prefix, value, tag }
            })
            .collect()
    }
}

impl Default for HighlightRules {
    fn default() -> Self {
        Self::clinical()
    }
}

/// Only the first colon delimits the label; later colons stay in the value.
fn split_label(piece: &str) -> (String, String) {
    match piece.split_once(':') {
        Some((label, rest)) => (format!("{label}: "), rest.trim().to_string()),
        None => (String::new(), piece.to_string()),
    }
}

/// Highlights an item with the clinical rule set.
pub fn highlight(item: &TaggedItem) -> Vec<Segment> {
    static RULES: OnceLock<HighlightRules> = OnceLock::new();
    RULES.get_or_init(HighlightRules::clinical).segments(item)
}

/// Plain-text form of a segment list, without emphasis.
pub fn plain_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| format!("{}{}", s.prefix, s.value))
        .collect::<Vec<_>>()
        .join(RENDERED_SEGMENT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(s: &str) -> Option<StyleTag> {
        Some(StyleTag::from(s))
    }

    #[test]
    fn test_fever_value_uses_temperature_key() {
        let item = TaggedItem::plain("Temp: 38.5 Febre").with_highlight(TEMPERATURE_KEY, "alert");
        let segments = highlight(&item);
        assert_eq!(
            segments,
            vec![Segment {
                prefix: "Temp: ".into(),
                value: "38.5 Febre".into(),
                tag: tag("alert"),
            }]
        );
    }

    #[test]
    fn test_fever_match_is_case_insensitive() {
        let item =
            TaggedItem::plain("Tax: 37.6 SUBFEBRIL").with_highlight(TEMPERATURE_KEY, "warn");
        assert_eq!(highlight(&item)[0].tag, tag("warn"));
    }

    #[test]
    fn test_first_word_lookup() {
        let item = TaggedItem::plain("PA: 120x80 normal").with_highlight("120x80", "ok");
        let segments = highlight(&item);
        assert_eq!(segments[0].prefix, "PA: ");
        assert_eq!(segments[0].value, "120x80 normal");
        assert_eq!(segments[0].tag, tag("ok"));
    }

    #[test]
    fn test_fever_rule_terminates_without_temperature_key() {
        // "38.5" would match the first-word rule, but the fever rule matched first.
        let item = TaggedItem::plain("Temp: 38.5 febre").with_highlight("38.5", "alert");
        assert_eq!(highlight(&item)[0].tag, None);
    }

    #[test]
    fn test_missing_key_means_no_tag() {
        let item = TaggedItem::plain("FC: 88 bpm");
        assert_eq!(highlight(&item)[0].tag, None);
    }

    #[test]
    fn test_multiple_segments_and_colons() {
        let item = TaggedItem::plain("Hb: 9.1 | Horário: 06:30 | sem alterações")
            .with_highlight("06:30", "muted");
        let segments = highlight(&item);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].prefix, "Horário: ");
        assert_eq!(segments[1].value, "06:30");
        assert_eq!(segments[1].tag, tag("muted"));
        assert_eq!(segments[2].prefix, "");
        assert_eq!(segments[2].value, "sem alterações");
        assert_eq!(
            plain_text(&segments),
            "Hb: 9.1 | Horário: 06:30 | sem alterações"
        );
    }

    #[test]
    fn test_blank_item_produces_no_segments() {
        assert!(highlight(&TaggedItem::plain("")).is_empty());
        assert!(highlight(&TaggedItem::plain("   ")).is_empty());
    }

    #[test]
    fn test_empty_pieces_are_dropped() {
        let item = TaggedItem::plain("Hb: 9.1 || Lac: 2 | ").with_highlight("2", "warn");
        let segments = highlight(&item);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].value, "2");
        assert_eq!(segments[1].tag, tag("warn"));
        assert_eq!(plain_text(&segments), "Hb: 9.1 | Lac: 2");
        assert!(highlight(&TaggedItem::plain(" | | ")).is_empty());
    }

    #[test]
    fn test_empty_value_after_label() {
        let item = TaggedItem::plain("pH:");
        let segments = highlight(&item);
        assert_eq!(segments[0].prefix, "pH: ");
        assert_eq!(segments[0].value, "");
        assert_eq!(segments[0].tag, None);
    }

    #[test]
    fn test_prepended_rule_takes_priority() {
        let mut rules = HighlightRules::clinical();
        rules.prepend(HighlightRule::matching("(?i)sepse", "SEPSIS").unwrap());
        let item = TaggedItem::plain("Lac: 4.2 sepse Febre")
            .with_highlight("SEPSIS", "critical")
            .with_highlight(TEMPERATURE_KEY, "alert");
        assert_eq!(rules.segments(&item)[0].tag, tag("critical"));
    }
}
