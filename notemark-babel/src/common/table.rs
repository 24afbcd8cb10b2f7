//! Pipe table helpers.
//!
//! A table row is stored as one line whose cells are separated by
//! [`TABLE_CELL_DELIMITER`]. These helpers split rows back into cells and render
//! the pipe-table text.

use crate::model::{InlineRun, TableMeta, TABLE_CELL_DELIMITER};

/// Replaces the reserved cell delimiter inside imported cell text.
pub fn sanitize_cell_text(text: &str) -> String {
    text.replace(TABLE_CELL_DELIMITER, " ")
}

/// Splits a row's runs into per-cell runs at each cell delimiter.
pub fn split_cells(runs: &[InlineRun]) -> Vec<Vec<InlineRun>> {
    let mut cells = vec![Vec::new()];
    for run in runs {
        let mut pieces = run.text.split(TABLE_CELL_DELIMITER);
        if let Some(first) = pieces.next() {
            push_piece(&mut cells, first, run);
        }
        for piece in pieces {
            cells.push(Vec::new());
            push_piece(&mut cells, piece, run);
        }
    }
    cells
}

fn push_piece(cells: &mut [Vec<InlineRun>], piece: &str, run: &InlineRun) {
    if piece.is_empty() {
        return;
    }
    if let Some(cell) = cells.last_mut() {
        cell.push(InlineRun::new(piece, run.attributes.clone()));
    }
}

/// Escapes pipes so rendered cell text cannot end a cell.
pub fn escape_pipes(cell: &str) -> String {
    cell.replace('|', "\\|")
}

/// Renders one row, padded with empty cells up to `width` columns.
pub fn render_row(cells: &[String], width: usize) -> String {
    let mut row = String::from("|");
    for index in 0..width.max(cells.len()).max(1) {
        let cell = cells.get(index).map(String::as_str).unwrap_or("");
        row.push(' ');
        row.push_str(cell);
        if !cell.is_empty() {
            row.push(' ');
        }
        row.push('|');
    }
    row
}

/// Synthesized alignment row for `width` columns.
pub fn alignment_row(meta: Option<&TableMeta>, width: usize) -> String {
    let mut row = String::from("|");
    for column in 0..width.max(1) {
        let alignment = meta.map(|meta| meta.alignment(column)).unwrap_or_default();
        row.push(' ');
        row.push_str(alignment.delimiter_cell());
        row.push_str(" |");
    }
    row
}
