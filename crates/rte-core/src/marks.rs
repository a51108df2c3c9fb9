use serde_json::Value;

use crate::core::{Editor, Point};
use crate::error::{ApplyError, CommandError, QueryError};
use crate::ops::Op;
use crate::path::{self, Path};
use crate::plugin::{CommandSpec, EditorPlugin, QuerySpec, arg_str, command_result};
use crate::query;
use crate::transforms;
use crate::schema::{MarkType, Marks};

pub const DEFAULT_FONT_SIZE: u32 = 16;
pub const MIN_FONT_SIZE: u32 = 1;
pub const MAX_FONT_SIZE: u32 = 200;

pub const FONT_SIZE_SCALE: [u32; 19] = [
    8, 9, 10, 11, 12, 14, 16, 18, 20, 24, 28, 32, 36, 42, 48, 56, 64, 72, 96,
];

/// Picker palette, eight rows of ten from greys to the darkest shades.
pub const FONT_COLORS: [&str; 80] = [
    "#000000", "#434343", "#666666", "#999999", "#b7b7b7", "#cccccc", "#d9d9d9", "#efefef",
    "#f3f3f3", "#ffffff", //
    "#980000", "#ff0000", "#ff9900", "#ffff00", "#00ff00", "#00ffff", "#4a86e8", "#0000ff",
    "#9900ff", "#ff00ff", //
    "#e6b8af", "#f4cccc", "#fce5cd", "#fff2cc", "#d9ead3", "#d0e0e3", "#c9daf8", "#cfe2f3",
    "#d9d2e9", "#ead1dc", //
    "#dd7e6b", "#ea9999", "#f9cb9c", "#ffe599", "#b6d7a8", "#a2c4c9", "#a4c2f4", "#9fc5e8",
    "#b4a7d6", "#d5a6bd", //
    "#cc4125", "#e06666", "#f6b26b", "#ffd966", "#93c47d", "#76a5af", "#6d9eeb", "#6fa8dc",
    "#8e7cc3", "#c27ba0", //
    "#a61c00", "#cc0000", "#e69138", "#f1c232", "#6aa84f", "#45818e", "#3c78d8", "#3d85c6",
    "#674ea7", "#a64d79", //
    "#85200c", "#990000", "#b45f06", "#bf9000", "#38761d", "#134f5c", "#1155cc", "#0b5394",
    "#351c75", "#741b47", //
    "#5b0f00", "#660000", "#783f04", "#7f6011", "#274e13", "#0c343d", "#1c4587", "#073763",
    "#20124d", "#4c1130",
];

/// Formatting that newly typed text would get.
///
/// A collapsed caret reports pending caret marks first, then the run under
/// the caret (the previous run in the same block when the caret sits at a
/// run start). An expanded selection reports its first covered run.
pub fn marks_at_selection(editor: &Editor) -> Option<Marks> {
    let selection = editor.selection()?;

    if !selection.is_collapsed() {
        let (start, end) = selection.ordered();
        return editable_runs_between(editor, &start, &end)
            .into_iter()
            .next()
            .and_then(|p| query::text_at_path(editor.doc(), &p))
            .map(|t| t.marks.clone());
    }

    if let Some(marks) = editor.pending_marks() {
        return Some(marks.clone());
    }

    let anchor = &selection.anchor;
    let run = query::text_at_path(editor.doc(), &anchor.path)?;
    if anchor.offset == 0 {
        if let Some(prev) = previous_run_in_block(editor, &anchor.path) {
            if let Some(t) = query::text_at_path(editor.doc(), &prev) {
                return Some(t.marks.clone());
            }
        }
    }
    Some(run.marks.clone())
}

fn previous_run_in_block(editor: &Editor, run: &[usize]) -> Option<Path> {
    let (block, _) = editor.block_above(path::parent(run))?;
    let mut prev = None;
    for (p, _) in editor.block_texts(&block) {
        if p.as_slice() == run {
            return prev;
        }
        prev = Some(p);
    }
    None
}

/// Runs from `start` to `end` that carry editable text.
fn editable_runs_between(editor: &Editor, start: &Point, end: &Point) -> Vec<Path> {
    query::texts_between(editor.doc(), start, end)
        .into_iter()
        .map(|(p, _)| p)
        .filter(|p| editor.void_above(path::parent(p)).is_none())
        .collect()
}

pub fn is_mark_active(editor: &Editor, mark: MarkType) -> bool {
    marks_at_selection(editor).is_some_and(|marks| marks.get(mark))
}

pub fn toggle_mark(editor: &mut Editor, mark: MarkType) -> Result<(), ApplyError> {
    if editor.selection().is_none() {
        return Ok(());
    }
    if is_mark_active(editor, mark) {
        remove_mark(editor, mark)
    } else {
        add_mark(editor, mark)
    }
}

pub fn add_mark(editor: &mut Editor, mark: MarkType) -> Result<(), ApplyError> {
    update_marks(editor, |marks| marks.set(mark, true))
}

pub fn remove_mark(editor: &mut Editor, mark: MarkType) -> Result<(), ApplyError> {
    update_marks(editor, |marks| marks.set(mark, false))
}

/// Applies `update` to the selection's formatting. A collapsed caret only
/// records pending marks; an expanded selection splits the runs at its
/// edges and rewrites every covered run.
pub fn update_marks(editor: &mut Editor, update: impl Fn(&mut Marks)) -> Result<(), ApplyError> {
    let Some(selection) = editor.selection().cloned() else {
        return Ok(());
    };

    if selection.is_collapsed() {
        let mut marks = marks_at_selection(editor).unwrap_or_default();
        update(&mut marks);
        editor.set_pending_marks(Some(marks));
        return Ok(());
    }

    let (start, end) = selection.ordered();
    editor.batch(|editor| {
        let runs = transforms::isolate_range(editor, &start, &end)?;
        for run in runs {
            if editor.void_above(path::parent(&run)).is_some() {
                continue;
            }
            let Some(text) = query::text_at_path(editor.doc(), &run) else {
                continue;
            };
            let mut marks = text.marks.clone();
            update(&mut marks);
            if marks != text.marks {
                editor.apply_op(Op::SetMarks { path: run, marks })?;
            }
        }
        Ok(())
    })
}

pub fn get_current_font_size(editor: &Editor) -> u32 {
    marks_at_selection(editor)
        .and_then(|marks| marks.font_size)
        .unwrap_or(DEFAULT_FONT_SIZE)
}

/// `None`, or a size that rounds to the default, clears the attribute.
pub fn set_font_size(editor: &mut Editor, size: Option<f64>) -> Result<(), ApplyError> {
    let size = size
        .filter(|s| s.is_finite())
        .map(|s| (s.round() as i64).clamp(MIN_FONT_SIZE as i64, MAX_FONT_SIZE as i64) as u32)
        .filter(|&s| s != DEFAULT_FONT_SIZE);
    update_marks(editor, |marks| marks.font_size = size)
}

pub fn increase_font_size(editor: &mut Editor) -> Result<(), ApplyError> {
    let current = get_current_font_size(editor);
    let next = FONT_SIZE_SCALE
        .iter()
        .copied()
        .find(|&s| s > current)
        .unwrap_or_else(|| (current + 2).min(MAX_FONT_SIZE));
    set_font_size(editor, Some(f64::from(next)))
}

pub fn decrease_font_size(editor: &mut Editor) -> Result<(), ApplyError> {
    let current = get_current_font_size(editor);
    let next = FONT_SIZE_SCALE
        .iter()
        .rev()
        .copied()
        .find(|&s| s < current)
        .unwrap_or_else(|| current.saturating_sub(2).max(MIN_FONT_SIZE));
    set_font_size(editor, Some(f64::from(next)))
}

pub fn get_current_font_color(editor: &Editor) -> Option<String> {
    marks_at_selection(editor).and_then(|marks| marks.font_color)
}

/// `None` (or an empty string) reverts to the inherited color.
pub fn set_font_color(editor: &mut Editor, color: Option<&str>) -> Result<(), ApplyError> {
    let color = color
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    update_marks(editor, |marks| marks.font_color = color.clone())
}

fn parse_mark(args: Option<&Value>) -> Result<MarkType, CommandError> {
    let raw = arg_str(args, "mark").ok_or_else(|| CommandError::new("Missing args.mark"))?;
    serde_json::from_value(Value::String(raw.to_string()))
        .map_err(|_| CommandError::new(format!("Unknown mark: {raw}")))
}

pub struct MarksPlugin;

impl EditorPlugin for MarksPlugin {
    fn id(&self) -> &'static str {
        "marks"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("marks.toggle", "Toggle mark", |editor, args| {
                let mark = parse_mark(args.as_ref())?;
                command_result("toggle mark", toggle_mark(editor, mark))
            })
            .description("Toggle a boolean mark on the selection or caret.")
            .keywords(["bold", "italic", "underline", "strikethrough", "code", "mark"])
            .args_example(serde_json::json!({ "mark": "bold" })),
            CommandSpec::new("marks.add", "Add mark", |editor, args| {
                let mark = parse_mark(args.as_ref())?;
                command_result("add mark", add_mark(editor, mark))
            })
            .description("Turn a boolean mark on for the selection or caret.")
            .keywords(["mark", "format"])
            .args_example(serde_json::json!({ "mark": "italic" })),
            CommandSpec::new("marks.remove", "Remove mark", |editor, args| {
                let mark = parse_mark(args.as_ref())?;
                command_result("remove mark", remove_mark(editor, mark))
            })
            .description("Turn a boolean mark off for the selection or caret.")
            .keywords(["mark", "format", "clear"])
            .args_example(serde_json::json!({ "mark": "italic" })),
            CommandSpec::new("font_size.set", "Set font size", |editor, args| {
                let size = args.as_ref().and_then(|v| v.get("size")).and_then(Value::as_f64);
                command_result("set font size", set_font_size(editor, size))
            })
            .description("Set the font size in pixels; null restores the default.")
            .keywords(["font", "size", "text"])
            .args_example(serde_json::json!({ "size": 24 })),
            CommandSpec::new("font_size.increase", "Increase font size", |editor, _args| {
                command_result("increase font size", increase_font_size(editor))
            })
            .description("Step the font size up the size scale.")
            .keywords(["font", "size", "bigger", "larger"]),
            CommandSpec::new("font_size.decrease", "Decrease font size", |editor, _args| {
                command_result("decrease font size", decrease_font_size(editor))
            })
            .description("Step the font size down the size scale.")
            .keywords(["font", "size", "smaller"]),
            CommandSpec::new("font_color.set", "Set font color", |editor, args| {
                let color = arg_str(args.as_ref(), "color");
                command_result("set font color", set_font_color(editor, color))
            })
            .description("Set the text color; null restores the inherited color.")
            .keywords(["font", "color", "colour", "text"])
            .args_example(serde_json::json!({ "color": "#ff0000" })),
        ]
    }

    fn queries(&self) -> Vec<QuerySpec> {
        vec![
            QuerySpec::new("marks.active", |editor, _args| {
                serde_json::to_value(marks_at_selection(editor).unwrap_or_default())
                    .map_err(|err| QueryError::new(format!("Failed to encode marks: {err}")))
            }),
            QuerySpec::new("marks.is_active", |editor, args| {
                let mark = parse_mark(args.as_ref()).map_err(|err| QueryError::new(err.message()))?;
                Ok(Value::Bool(is_mark_active(editor, mark)))
            }),
            QuerySpec::new("font_size.current", |editor, _args| {
                Ok(Value::from(get_current_font_size(editor)))
            }),
            QuerySpec::new("font_color.current", |editor, _args| {
                Ok(get_current_font_color(editor).map_or(Value::Null, Value::String))
            }),
        ]
    }
}
