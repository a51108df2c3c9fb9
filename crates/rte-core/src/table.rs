//! Table grid editing: insertion, row and column edits, Tab navigation and
//! column widths. Every function locates the table from the selection and
//! returns `false` when the selection is not inside a cell or the edit would
//! cross a size limit.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{Editor, Selection};
use crate::error::{ApplyError, CommandError, QueryError};
use crate::ops::Op;
use crate::path::{self, Path};
use crate::plugin::{CommandSpec, EditorPlugin, QuerySpec, arg_u64, command_result};
use crate::query;
use crate::schema::{Element, ElementKind, ElementType, Node};
use crate::transforms;

pub const MIN_ROWS: usize = 2;
pub const MAX_ROWS: usize = 10;
pub const MIN_COLS: usize = 2;
pub const MAX_COLS: usize = 6;
pub const DEFAULT_ROWS: usize = 3;
pub const DEFAULT_COLS: usize = 3;
pub const MAX_ROWS_AFTER_INSERT: usize = 50;
pub const MAX_COLS_AFTER_INSERT: usize = 12;
pub const DEFAULT_COL_WIDTH: u32 = 120;
pub const MIN_COL_WIDTH: u32 = 24;

/// Where the selection sits inside a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSelection {
    pub table_path: Path,
    pub row_index: usize,
    pub col_index: usize,
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDimensions {
    pub rows: usize,
    pub cols: usize,
}

fn empty_cell() -> Node {
    Node::element(
        ElementKind::TableCell { header: false },
        vec![Node::paragraph("")],
    )
}

fn empty_row(cols: usize) -> Node {
    Node::element(ElementKind::TableRow, (0..cols).map(|_| empty_cell()).collect())
}

/// Inserts a `rows` x `cols` grid of empty cells, clamped to the insertable
/// range, and places the caret in its first cell.
pub fn insert_table(editor: &mut Editor, rows: usize, cols: usize) -> Result<(), ApplyError> {
    let rows = rows.clamp(MIN_ROWS, MAX_ROWS);
    let cols = cols.clamp(MIN_COLS, MAX_COLS);
    let table = Node::element(
        ElementKind::Table {
            col_widths: Some(vec![DEFAULT_COL_WIDTH; cols]),
        },
        (0..rows).map(|_| empty_row(cols)).collect(),
    );
    editor.batch(|editor| {
        transforms::insert_nodes(editor, vec![table])?;
        let table_path = editor
            .selection()
            .and_then(|sel| query::closest_of_type(editor.doc(), &sel.focus.path, ElementType::Table));
        if let Some(table_path) = table_path {
            transforms::select_start(editor, &path::child(&path::child(&table_path, 0), 0));
        }
        Ok(())
    })
}

/// True when any run covered by the selection lies inside a table.
pub fn is_in_table(editor: &Editor) -> bool {
    let Some(selection) = editor.selection() else {
        return false;
    };
    let (start, end) = selection.ordered();
    query::texts_between(editor.doc(), &start, &end)
        .iter()
        .any(|(run, _)| query::closest_of_type(editor.doc(), run, ElementType::Table).is_some())
}

/// Row count and the first row's cell count.
pub fn table_dimensions(editor: &Editor, table_path: &[usize]) -> Option<TableDimensions> {
    let table = query::element_at_path(editor.doc(), table_path)?;
    if table.element_type() != ElementType::Table {
        return None;
    }
    Some(TableDimensions {
        rows: table.children.len(),
        cols: table.children.first().map_or(0, |row| row.children().len()),
    })
}

/// The cell holding the selection anchor, relative to its nearest table.
pub fn get_table_selection(editor: &Editor) -> Option<TableSelection> {
    let anchor = &editor.selection()?.anchor;
    let table_path = query::closest_of_type(editor.doc(), &anchor.path, ElementType::Table)?;
    let depth = table_path.len();
    if anchor.path.len() < depth + 3 {
        return None;
    }
    let dims = table_dimensions(editor, &table_path)?;
    Some(TableSelection {
        row_index: anchor.path[depth],
        col_index: anchor.path[depth + 1],
        rows: dims.rows,
        cols: dims.cols,
        table_path,
    })
}

/// Stored widths when they match the column count, otherwise the default
/// width for every column.
pub fn table_column_widths(table: &Element) -> Vec<u32> {
    let cols = table.children.first().map_or(0, |row| row.children().len());
    match &table.kind {
        ElementKind::Table {
            col_widths: Some(widths),
        } if widths.len() == cols && !widths.contains(&0) => widths.clone(),
        _ => vec![DEFAULT_COL_WIDTH; cols],
    }
}

fn stored_widths(editor: &Editor, table_path: &[usize], cols: usize) -> Option<Vec<u32>> {
    match &query::element_at_path(editor.doc(), table_path)?.kind {
        ElementKind::Table {
            col_widths: Some(widths),
        } if widths.len() == cols => Some(widths.clone()),
        _ => None,
    }
}

fn set_widths(editor: &mut Editor, table_path: &[usize], widths: Vec<u32>) -> Result<(), ApplyError> {
    editor.apply_op(Op::SetElement {
        path: table_path.to_vec(),
        kind: ElementKind::Table {
            col_widths: Some(widths),
        },
    })
}

fn insert_row_at(editor: &mut Editor, row_offset: usize) -> Result<bool, ApplyError> {
    let Some(sel) = get_table_selection(editor) else {
        return Ok(false);
    };
    if sel.rows >= MAX_ROWS_AFTER_INSERT {
        tracing::debug!(rows = sel.rows, "row limit reached");
        return Ok(false);
    }
    editor.apply_op(Op::InsertNode {
        path: path::child(&sel.table_path, sel.row_index + row_offset),
        node: empty_row(sel.cols),
    })?;
    Ok(true)
}

pub fn insert_row_above(editor: &mut Editor) -> Result<bool, ApplyError> {
    insert_row_at(editor, 0)
}

pub fn insert_row_below(editor: &mut Editor) -> Result<bool, ApplyError> {
    insert_row_at(editor, 1)
}

fn insert_column_at(editor: &mut Editor, col_offset: usize) -> Result<bool, ApplyError> {
    let Some(sel) = get_table_selection(editor) else {
        return Ok(false);
    };
    if sel.cols >= MAX_COLS_AFTER_INSERT {
        tracing::debug!(cols = sel.cols, "column limit reached");
        return Ok(false);
    }
    let at = sel.col_index + col_offset;
    let mut widths = stored_widths(editor, &sel.table_path, sel.cols)
        .unwrap_or_else(|| vec![DEFAULT_COL_WIDTH; sel.cols]);
    widths.insert(at.min(widths.len()), DEFAULT_COL_WIDTH);

    editor.batch(|editor| {
        for row in 0..sel.rows {
            editor.apply_op(Op::InsertNode {
                path: path::child(&path::child(&sel.table_path, row), at),
                node: empty_cell(),
            })?;
        }
        set_widths(editor, &sel.table_path, widths)
    })?;
    Ok(true)
}

pub fn insert_column_left(editor: &mut Editor) -> Result<bool, ApplyError> {
    insert_column_at(editor, 0)
}

pub fn insert_column_right(editor: &mut Editor) -> Result<bool, ApplyError> {
    insert_column_at(editor, 1)
}

/// Removes the current row. The last row is never removed; delete the
/// table instead.
pub fn delete_row(editor: &mut Editor) -> Result<bool, ApplyError> {
    let Some(sel) = get_table_selection(editor) else {
        return Ok(false);
    };
    if sel.rows <= 1 {
        tracing::debug!("refusing to delete the only row");
        return Ok(false);
    }
    editor.apply_op(Op::RemoveNode {
        path: path::child(&sel.table_path, sel.row_index),
    })?;
    Ok(true)
}

/// Removes the current column, keeping at least [`MIN_COLS`].
pub fn delete_column(editor: &mut Editor) -> Result<bool, ApplyError> {
    let Some(sel) = get_table_selection(editor) else {
        return Ok(false);
    };
    if sel.cols <= MIN_COLS {
        tracing::debug!(cols = sel.cols, "column floor reached");
        return Ok(false);
    }
    let widths = stored_widths(editor, &sel.table_path, sel.cols);

    editor.batch(|editor| {
        if let Some(mut widths) = widths {
            widths.remove(sel.col_index.min(widths.len() - 1));
            set_widths(editor, &sel.table_path, widths)?;
        }
        for row in (0..sel.rows).rev() {
            let cell = path::child(&path::child(&sel.table_path, row), sel.col_index);
            if query::node_at_path(editor.doc(), &cell).is_some() {
                editor.apply_op(Op::RemoveNode { path: cell })?;
            }
        }
        Ok(())
    })?;
    Ok(true)
}

pub fn delete_table(editor: &mut Editor) -> Result<bool, ApplyError> {
    let Some(sel) = get_table_selection(editor) else {
        return Ok(false);
    };
    editor.apply_op(Op::RemoveNode {
        path: sel.table_path,
    })?;
    Ok(true)
}

fn select_cell_start(editor: &mut Editor, table_path: &[usize], row: usize, col: usize) -> bool {
    let cell = path::child(&path::child(table_path, row), col);
    match query::start_point(editor.doc(), &cell) {
        Some(point) => {
            editor.set_selection(Some(Selection::collapsed(point)));
            true
        }
        None => false,
    }
}

/// Tab: moves to the next cell, wrapping to the next row. Past the last
/// cell a new row is added and the caret lands in its first cell.
pub fn select_next_table_cell(editor: &mut Editor) -> Result<bool, ApplyError> {
    let Some(sel) = get_table_selection(editor) else {
        return Ok(false);
    };
    let (mut row, mut col) = (sel.row_index, sel.col_index + 1);
    if col >= sel.cols {
        col = 0;
        row += 1;
    }
    if row >= sel.rows {
        if !insert_row_below(editor)? {
            return Ok(false);
        }
        row = sel.row_index + 1;
        col = 0;
    }
    Ok(select_cell_start(editor, &sel.table_path, row, col))
}

/// Shift+Tab: moves to the previous cell, wrapping to the previous row.
/// Returns false in the first cell so the caller's default applies.
pub fn select_previous_table_cell(editor: &mut Editor) -> Result<bool, ApplyError> {
    let Some(sel) = get_table_selection(editor) else {
        return Ok(false);
    };
    let (row, col) = match (sel.row_index, sel.col_index) {
        (0, 0) => return Ok(false),
        (row, 0) => (row - 1, sel.cols.saturating_sub(1)),
        (row, col) => (row, col - 1),
    };
    Ok(select_cell_start(editor, &sel.table_path, row, col))
}

/// Drags the divider right of column `col` by `delta` pixels. The right
/// neighbour absorbs the inverse change so the total width is unchanged,
/// and neither column shrinks below [`MIN_COL_WIDTH`].
pub fn resize_table_column(
    editor: &mut Editor,
    table_path: &[usize],
    col: usize,
    delta: i64,
) -> Result<bool, ApplyError> {
    let Some(table) = query::element_at_path(editor.doc(), table_path)
        .filter(|el| el.element_type() == ElementType::Table)
    else {
        return Ok(false);
    };
    let mut widths = table_column_widths(table);
    if col + 1 >= widths.len() {
        return Ok(false);
    }

    let left = i64::from(widths[col]);
    let right = i64::from(widths[col + 1]);
    let min = i64::from(MIN_COL_WIDTH);
    let (lo, hi) = (min - left, right - min);
    if lo > hi {
        return Ok(false);
    }
    let delta = delta.clamp(lo, hi);
    if delta == 0 {
        return Ok(false);
    }
    widths[col] = (left + delta) as u32;
    widths[col + 1] = (right - delta) as u32;
    set_widths(editor, table_path, widths)?;
    Ok(true)
}

/// Replaces all column widths. Widths are floored at [`MIN_COL_WIDTH`];
/// a list that does not match the column count is rejected.
pub fn set_table_column_widths(
    editor: &mut Editor,
    table_path: &[usize],
    widths: &[u32],
) -> Result<bool, ApplyError> {
    let Some(dims) = table_dimensions(editor, table_path) else {
        return Ok(false);
    };
    if widths.len() != dims.cols {
        tracing::debug!(given = widths.len(), cols = dims.cols, "column width count mismatch");
        return Ok(false);
    }
    let widths = widths.iter().map(|w| (*w).max(MIN_COL_WIDTH)).collect();
    set_widths(editor, table_path, widths)?;
    Ok(true)
}

fn current_table(editor: &Editor) -> Result<Path, CommandError> {
    get_table_selection(editor)
        .map(|sel| sel.table_path)
        .ok_or_else(|| CommandError::new("Selection is not inside a table"))
}

fn grid_command(
    id: &str,
    label: &str,
    description: &str,
    keywords: &[&str],
    edit: fn(&mut Editor) -> Result<bool, ApplyError>,
) -> CommandSpec {
    let action = label.to_lowercase();
    CommandSpec::new(id, label, move |editor, _args| command_result(&action, edit(editor)))
        .description(description)
        .keywords(keywords.iter().copied())
}

pub struct TablePlugin;

impl EditorPlugin for TablePlugin {
    fn id(&self) -> &'static str {
        "table"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("table.insert", "Insert table", |editor, args| {
                let rows = arg_u64(args.as_ref(), "rows").map_or(DEFAULT_ROWS, |r| r as usize);
                let cols = arg_u64(args.as_ref(), "cols").map_or(DEFAULT_COLS, |c| c as usize);
                command_result("insert table", insert_table(editor, rows, cols))
            })
            .description("Insert a table (2-10 rows, 2-6 columns).")
            .keywords(["table", "grid", "rows", "columns"])
            .args_example(serde_json::json!({ "rows": 3, "cols": 3 })),
            grid_command(
                "table.insert_row_above",
                "Insert row above",
                "Add an empty row above the current cell.",
                &["table", "row", "above"],
                insert_row_above,
            ),
            grid_command(
                "table.insert_row_below",
                "Insert row below",
                "Add an empty row below the current cell.",
                &["table", "row", "below"],
                insert_row_below,
            ),
            grid_command(
                "table.insert_column_left",
                "Insert column left",
                "Add an empty column left of the current cell.",
                &["table", "column", "left"],
                insert_column_left,
            ),
            grid_command(
                "table.insert_column_right",
                "Insert column right",
                "Add an empty column right of the current cell.",
                &["table", "column", "right"],
                insert_column_right,
            ),
            grid_command(
                "table.delete_row",
                "Delete row",
                "Remove the current row.",
                &["table", "row", "delete", "remove"],
                delete_row,
            ),
            grid_command(
                "table.delete_column",
                "Delete column",
                "Remove the current column.",
                &["table", "column", "delete", "remove"],
                delete_column,
            ),
            grid_command(
                "table.delete",
                "Delete table",
                "Remove the table holding the selection.",
                &["table", "delete", "remove"],
                delete_table,
            ),
            grid_command(
                "table.next_cell",
                "Next cell",
                "Move to the next cell, adding a row after the last one.",
                &["table", "tab", "next"],
                select_next_table_cell,
            ),
            grid_command(
                "table.previous_cell",
                "Previous cell",
                "Move to the previous cell.",
                &["table", "tab", "previous"],
                select_previous_table_cell,
            ),
            CommandSpec::new("table.resize_column", "Resize column", |editor, args| {
                let table = current_table(editor)?;
                let col = arg_u64(args.as_ref(), "col")
                    .ok_or_else(|| CommandError::new("Missing args.col"))? as usize;
                let delta = args
                    .as_ref()
                    .and_then(|v| v.get("delta"))
                    .and_then(Value::as_i64)
                    .ok_or_else(|| CommandError::new("Missing args.delta"))?;
                command_result("resize column", resize_table_column(editor, &table, col, delta))
            })
            .description("Move a column divider, trading width with the right neighbour.")
            .keywords(["table", "column", "width", "resize"])
            .args_example(serde_json::json!({ "col": 0, "delta": 40 })),
            CommandSpec::new("table.set_column_widths", "Set column widths", |editor, args| {
                let table = current_table(editor)?;
                let widths: Vec<u32> = args
                    .as_ref()
                    .and_then(|v| v.get("widths"))
                    .cloned()
                    .map(serde_json::from_value)
                    .transpose()
                    .map_err(|err| CommandError::new(format!("Invalid args.widths: {err}")))?
                    .ok_or_else(|| CommandError::new("Missing args.widths"))?;
                command_result("set column widths", set_table_column_widths(editor, &table, &widths))
            })
            .description("Replace every column width of the current table.")
            .keywords(["table", "column", "width"])
            .args_example(serde_json::json!({ "widths": [120, 200, 120] })),
        ]
    }

    fn queries(&self) -> Vec<QuerySpec> {
        vec![
            QuerySpec::new("table.is_in", |editor, _args| Ok(Value::Bool(is_in_table(editor)))),
            QuerySpec::new("table.selection", |editor, _args| {
                serde_json::to_value(get_table_selection(editor))
                    .map_err(|err| QueryError::new(format!("Failed to encode table selection: {err}")))
            }),
            QuerySpec::new("table.dimensions", |editor, _args| {
                let dims = get_table_selection(editor)
                    .and_then(|sel| table_dimensions(editor, &sel.table_path));
                serde_json::to_value(dims)
                    .map_err(|err| QueryError::new(format!("Failed to encode table dimensions: {err}")))
            }),
            QuerySpec::new("table.column_widths", |editor, _args| {
                let widths = get_table_selection(editor)
                    .and_then(|sel| query::element_at_path(editor.doc(), &sel.table_path))
                    .map(table_column_widths);
                serde_json::to_value(widths)
                    .map_err(|err| QueryError::new(format!("Failed to encode column widths: {err}")))
            }),
        ]
    }
}
