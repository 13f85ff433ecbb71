//! Problem-list codec.
//!
//! Encoded form (as produced by the note generator and persisted):
//!
//! ```text
//! Sepse ~ foco pulmonar | DRC ~ estágio 4 ~ não dialítico
//! ```
//!
//! Blocks are separated by `" | "`, parts within a block by `"~"`. The first part is the principal
//! statement, the rest are sub-items.
//!
//! Edit form (one line per part, sub-items marked with `>`):
//!
//! ```text
//! Sepse
//! > foco pulmonar
//! DRC
//! > estágio 4
//! > não dialítico
//! ```
//!
//! `collapse(expand(decode(s))) == s` holds for any whitespace-normalised `s` whose principal
//! statements do not themselves start with `>`.

use passometro_types::NonEmptyText;
use serde::Serialize;

pub const BLOCK_SEPARATOR: &str = " | ";
pub const PART_SEPARATOR: char = '~';
/// Separator used when re-encoding parts.
pub const ENCODED_PART_SEPARATOR: &str = " ~ ";
pub const SUB_ITEM_MARKER: char = '>';

/// One principal statement and the sub-items subordinate to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProblemBlock {
    pub principal: NonEmptyText,
    pub sub_items: Vec<NonEmptyText>,
}

impl ProblemBlock {
    pub fn new(principal: NonEmptyText) -> Self {
        Self {
            principal,
            sub_items: Vec::new(),
        }
    }

    pub fn with_sub_item(mut self, sub_item: NonEmptyText) -> Self {
        self.sub_items.push(sub_item);
        self
    }

    fn encode(&self) -> String {
        std::iter::once(self.principal.as_str())
            .chain(self.sub_items.iter().map(NonEmptyText::as_str))
            .collect::<Vec<_>>()
            .join(ENCODED_PART_SEPARATOR)
    }
}

/// What to do with a `>` line that appears before any principal statement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrphanPolicy {
    /// Discard the line.
    #[default]
    Drop,
    /// Treat the line's text as a new principal statement.
    Promote,
}

/// Result of collapsing edit text back into the encoded form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Collapsed {
    pub encoded: String,
    /// Orphan `>` lines that were discarded under [`OrphanPolicy::Drop`].
    pub orphans: Vec<String>,
}

/// Parses the encoded form into blocks. Empty blocks and empty parts are dropped.
pub fn decode(encoded: &str) -> Vec<ProblemBlock> {
    encoded
        .split(BLOCK_SEPARATOR)
        .filter_map(|block| {
            let mut parts = block.split(PART_SEPARATOR).filter_map(NonEmptyText::parse_opt);
            let principal = parts.next()?;
            Some(ProblemBlock {
                principal,
                sub_items: parts.collect(),
            })
        })
        .collect()
}

pub fn encode(blocks: &[ProblemBlock]) -> String {
    blocks
        .iter()
        .map(ProblemBlock::encode)
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// Rewrites blocks as edit lines: principal as-is, sub-items prefixed with `"> "`.
pub fn expand(blocks: &[ProblemBlock]) -> String {
    let mut lines = Vec::new();
    for block in blocks {
        lines.push(block.principal.as_str().to_string());
        lines.extend(
            block
                .sub_items
                .iter()
                .map(|sub| format!("{SUB_ITEM_MARKER} {sub}")),
        );
    }
    lines.join("\n")
}

/// Encoded form → edit form.
pub fn to_edit_text(encoded: &str) -> String {
    expand(&decode(encoded))
}

/// Edit form → encoded form, dropping orphan `>` lines.
pub fn collapse(edit_text: &str) -> String {
    collapse_with(edit_text, OrphanPolicy::Drop).encoded
}

/// Edit form → encoded form under an explicit orphan policy.
///
/// Blank lines are ignored. A line without a leading `>` opens a new block; a `>` line adds a
/// sub-item to the open block. A `>` line whose text is empty adds nothing.
pub fn collapse_with(edit_text: &str, policy: OrphanPolicy) -> Collapsed {
    let mut blocks: Vec<ProblemBlock> = Vec::new();
    let mut orphans = Vec::new();

    for line in edit_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.strip_prefix(SUB_ITEM_MARKER) {
            Some(rest) => {
                let Some(sub_item) = NonEmptyText::parse_opt(rest) else {
                    continue;
                };
                match (blocks.last_mut(), policy) {
                    (Some(open), _) => open.sub_items.push(sub_item),
                    (None, OrphanPolicy::Promote) => blocks.push(ProblemBlock::new(sub_item)),
                    (None, OrphanPolicy::Drop) => orphans.push(line.to_string()),
                }
            }
            None => {
                if let Some(principal) = NonEmptyText::parse_opt(line) {
                    blocks.push(ProblemBlock::new(principal));
                }
            }
        }
    }

    Collapsed {
        encoded: encode(&blocks),
        orphans,
    }
}
