//! Plain-text rendering of the handoff sheet, for terminals and printouts.
//!
//! Emphasised segment values are written as `[value](tag)`. Problem blocks use `▸` for the
//! principal statement with sub-items indented below it. The Condutas grid is printed as padded
//! columns; lines beyond the grid are summarised as `(+N ocultas)`.

use crate::constants::{EMPTY_SHEET_MESSAGE, SHEET_TITLE};
use crate::sheet::{FieldRender, FieldView, RenderedRecord, RenderedSheet};
use passometro_codec::highlight::RENDERED_SEGMENT_SEPARATOR;
use passometro_codec::{DirectiveGrid, ProblemBlock, RenderedField, Segment};

const INDENT: &str = "  ";
const BODY_INDENT: &str = "    ";
const SUB_ITEM_INDENT: &str = "      ";
const PRINCIPAL_MARKER: &str = "▸";
const GRID_GAP: &str = "   ";

/// Renders sheets as plain text.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer;

impl TextRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Renders the whole sheet under its title.
    pub fn render_sheet(&self, sheet: &RenderedSheet) -> String {
        let mut output = String::new();
        output.push_str(SHEET_TITLE);
        output.push('\n');

        if sheet.is_empty() {
            output.push('\n');
            output.push_str(EMPTY_SHEET_MESSAGE);
            output.push('\n');
            return output;
        }

        for record in &sheet.records {
            output.push('\n');
            output.push_str(&self.render_record(record));
        }
        output
    }

    pub fn render_record(&self, record: &RenderedRecord) -> String {
        let mut output = String::new();
        output.push_str(&record.header.title);
        output.push('\n');
        if let Some(details) = &record.header.details {
            output.push_str(details);
            output.push('\n');
        }
        for field in &record.fields {
            render_field(&mut output, field);
        }
        output
    }
}

fn render_field(output: &mut String, field: &FieldRender) {
    match &field.view {
        FieldView::Editing { text } => {
            output.push_str(&format!("{INDENT}{} (editando):\n", field.title));
            for line in text.lines() {
                push_body_line(output, line);
            }
        }
        FieldView::Display { rendered } => {
            output.push_str(&format!("{INDENT}{}:\n", field.title));
            render_body(output, rendered);
        }
    }
}

fn render_body(output: &mut String, rendered: &RenderedField) {
    match rendered {
        RenderedField::Narrative {
            text,
            preserve_line_breaks: true,
        } => {
            for line in text.lines() {
                push_body_line(output, line.trim_end());
            }
        }
        RenderedField::Narrative { text, .. } => {
            let flowed = text.split_whitespace().collect::<Vec<_>>().join(" ");
            push_body_line(output, &flowed);
        }
        RenderedField::Problems(blocks) => {
            for block in blocks {
                render_block(output, block);
            }
        }
        RenderedField::Items(items) => {
            for segments in items {
                push_body_line(output, &segments_text(segments));
            }
        }
        RenderedField::Label(text) => push_body_line(output, text.trim()),
        RenderedField::Lines(lines) => {
            for line in lines {
                push_body_line(output, line);
            }
        }
        RenderedField::Grid(grid) => render_grid(output, grid),
    }
}

fn push_body_line(output: &mut String, line: &str) {
    output.push_str(BODY_INDENT);
    output.push_str(line);
    output.push('\n');
}

fn render_block(output: &mut String, block: &ProblemBlock) {
    output.push_str(&format!(
        "{BODY_INDENT}{PRINCIPAL_MARKER} {}\n",
        block.principal
    ));
    for sub_item in &block.sub_items {
        output.push_str(&format!("{SUB_ITEM_INDENT}{sub_item}\n"));
    }
}

/// Segments joined with the display separator, tagged values in link form.
pub fn segments_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| match &segment.tag {
            Some(tag) => format!("{}[{}]({})", segment.prefix, segment.value, tag),
            None => format!("{}{}", segment.prefix, segment.value),
        })
        .collect::<Vec<_>>()
        .join(RENDERED_SEGMENT_SEPARATOR)
}

fn render_grid(output: &mut String, grid: &DirectiveGrid) {
    let columns: Vec<&[String]> = grid.visible_columns().collect();
    let widths: Vec<usize> = columns
        .iter()
        .map(|col| col.iter().map(|line| line.chars().count()).max().unwrap_or(0))
        .collect();
    let rows = columns.iter().map(|col| col.len()).max().unwrap_or(0);

    for row in 0..rows {
        let cells: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(col, &width)| {
                let cell = col.get(row).map(String::as_str).unwrap_or("");
                format!("{cell:<width$}")
            })
            .collect();
        push_body_line(output, cells.join(GRID_GAP).trim_end());
    }

    if grid.hidden > 0 {
        push_body_line(output, &format!("(+{} ocultas)", grid.hidden));
    }
}
