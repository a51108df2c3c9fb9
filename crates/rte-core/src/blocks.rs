use serde_json::Value;

use crate::core::Editor;
use crate::error::{ApplyError, CommandError, QueryError};
use crate::path::{self, Path};
use crate::plugin::{CommandSpec, EditorPlugin, QuerySpec, arg_str, arg_u64, command_result};
use crate::query;
use crate::schema::{Align, Element, ElementKind, ElementType};
use crate::transforms;

fn matches_block(el: &Element, ty: ElementType, level: Option<u8>) -> bool {
    if el.element_type() != ty {
        return false;
    }
    match (ty, level) {
        (ElementType::Heading, Some(level)) => el.kind.heading_level() == Some(level),
        _ => true,
    }
}

/// Nearest non-inline element at or above `block` that matches.
fn matching_block_above(
    editor: &Editor,
    block: &[usize],
    ty: ElementType,
    level: Option<u8>,
) -> Option<Path> {
    query::closest_element(editor.doc(), block, |el| {
        !editor.is_inline(el) && matches_block(el, ty, level)
    })
    .map(|(p, _)| p)
}

/// True when a block covering the selection (a lowest selected block or
/// one of its block ancestors) has type `ty`, and for headings with a
/// `level`, that exact level.
pub fn is_block_active(editor: &Editor, ty: ElementType, level: Option<u8>) -> bool {
    editor
        .selected_blocks()
        .iter()
        .any(|block| matching_block_above(editor, block, ty, level).is_some())
}

fn nearest_list_above(editor: &Editor, block: &[usize]) -> Option<Path> {
    query::closest_element(editor.doc(), path::parent(block), |el| el.kind.is_list())
        .map(|(p, _)| p)
}

/// Unwraps every list container around the selected blocks, splitting the
/// containers so unselected items stay listed.
fn unwrap_selected_lists(editor: &mut Editor) -> Result<(), ApplyError> {
    loop {
        let blocks = editor.selected_blocks();
        let Some(list) = blocks
            .iter()
            .filter_map(|b| nearest_list_above(editor, b))
            .max_by(|a, b| path::compare(a, b).then(a.len().cmp(&b.len())))
        else {
            return Ok(());
        };

        let depth = list.len();
        let indices: Vec<usize> = blocks
            .iter()
            .filter(|b| path::is_ancestor(&list, b))
            .map(|b| b[depth])
            .collect();
        let (Some(&start), Some(&end)) = (indices.iter().min(), indices.iter().max()) else {
            return Ok(());
        };
        transforms::unwrap_children(editor, &list, start, end)?;
    }
}

fn retype_selected(
    editor: &mut Editor,
    target: ElementType,
    level: Option<u8>,
) -> Result<(), ApplyError> {
    for block in editor.selected_blocks() {
        let Some(el) = query::element_at_path(editor.doc(), &block) else {
            continue;
        };
        let Some(kind) = el.kind.retyped(target, level) else {
            continue;
        };
        transforms::set_element(editor, &block, kind)?;
    }
    Ok(())
}

/// Wraps runs of sibling blocks in `container`, one wrapper per parent.
fn wrap_selected(editor: &mut Editor, container: ElementKind) -> Result<(), ApplyError> {
    let blocks = editor.selected_blocks();
    let mut groups: Vec<(Path, usize, usize)> = Vec::new();
    for block in &blocks {
        let parent = path::parent(block).to_vec();
        let Some(ix) = path::last_index(block) else {
            continue;
        };
        match groups.last_mut() {
            Some((p, _, end)) if *p == parent && *end + 1 == ix => *end = ix,
            _ => groups.push((parent, ix, ix)),
        }
    }
    for (parent, start, end) in groups.into_iter().rev() {
        transforms::wrap_nodes(editor, &parent, start, end, container.clone())?;
    }
    Ok(())
}

/// Reverts an active block type. Lowest blocks of that type become
/// paragraphs; a matching container around them is unwrapped.
fn deactivate(editor: &mut Editor, ty: ElementType, level: Option<u8>) -> Result<(), ApplyError> {
    let mut containers: Vec<Path> = Vec::new();
    for block in editor.selected_blocks() {
        match matching_block_above(editor, &block, ty, level) {
            Some(found) if found == block => {
                if let Some(kind) = query::element_at_path(editor.doc(), &block)
                    .and_then(|el| el.kind.retyped(ElementType::Paragraph, None))
                {
                    transforms::set_element(editor, &block, kind)?;
                }
            }
            Some(found) => {
                if !containers.contains(&found) {
                    containers.push(found);
                }
            }
            None => {}
        }
    }
    containers.sort_by(|a, b| path::compare(b, a).then(b.len().cmp(&a.len())));
    for container in containers {
        transforms::unwrap_node(editor, &container)?;
    }
    Ok(())
}

/// Switches the selected blocks to `ty`, or back to paragraphs when `ty`
/// is already active. Enclosing lists are always unwrapped first.
pub fn toggle_block(editor: &mut Editor, ty: ElementType, level: Option<u8>) -> Result<(), ApplyError> {
    if editor.selection().is_none() {
        return Ok(());
    }
    let active = is_block_active(editor, ty, level);
    editor.batch(|editor| {
        unwrap_selected_lists(editor)?;

        if active {
            if ty.is_list() {
                retype_selected(editor, ElementType::Paragraph, None)
            } else {
                deactivate(editor, ty, level)
            }
        } else if let Some(container) = ty.list_container() {
            retype_selected(editor, ElementType::ListItem, None)?;
            wrap_selected(editor, container)
        } else {
            retype_selected(editor, ty, level)
        }
    })
}

/// Nearest alignable block at or above each selected block.
fn alignable_blocks(editor: &Editor) -> Vec<Path> {
    let mut out: Vec<Path> = Vec::new();
    for block in editor.selected_blocks() {
        let found = query::closest_element(editor.doc(), &block, |el| {
            el.element_type().is_alignable()
        });
        if let Some((p, _)) = found {
            if !out.contains(&p) {
                out.push(p);
            }
        }
    }
    out
}

/// Shared alignment of the selected blocks; `None` when they disagree or
/// none is alignable.
pub fn get_block_align(editor: &Editor) -> Option<Align> {
    let blocks = alignable_blocks(editor);
    let mut aligns = blocks
        .iter()
        .filter_map(|p| query::element_at_path(editor.doc(), p))
        .map(|el| el.kind.align());
    let first = aligns.next()??;
    aligns.all(|a| a == Some(first)).then_some(first)
}

/// Sets (or with `None`, clears) the alignment of every selected alignable
/// block.
pub fn set_block_align(editor: &mut Editor, align: Option<Align>) -> Result<(), ApplyError> {
    let blocks = alignable_blocks(editor);
    if blocks.is_empty() {
        return Ok(());
    }
    editor.batch(|editor| {
        for block in blocks {
            let Some(kind) = query::element_at_path(editor.doc(), &block)
                .and_then(|el| el.kind.with_align(align))
            else {
                continue;
            };
            transforms::set_element(editor, &block, kind)?;
        }
        Ok(())
    })
}

pub(crate) fn parse_element_type(raw: &str) -> Option<ElementType> {
    serde_json::from_value(Value::String(raw.to_string())).ok()
}

fn block_args(args: Option<&Value>) -> Result<(ElementType, Option<u8>), String> {
    let raw = arg_str(args, "type").ok_or("Missing args.type")?;
    let ty = parse_element_type(raw).ok_or_else(|| format!("Unknown block type: {raw}"))?;
    let level = arg_u64(args, "level").map(|l| l.clamp(1, 6) as u8);
    Ok((ty, level))
}

fn parse_align_arg(args: Option<&Value>) -> Result<Option<Align>, CommandError> {
    match arg_str(args, "align") {
        None => Ok(None),
        Some(raw) => Align::parse(raw)
            .map(Some)
            .ok_or_else(|| CommandError::new(format!("Unknown alignment: {raw}"))),
    }
}

pub struct BlocksPlugin;

impl EditorPlugin for BlocksPlugin {
    fn id(&self) -> &'static str {
        "blocks"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("block.toggle", "Toggle block type", |editor, args| {
                let (ty, level) = block_args(args.as_ref()).map_err(CommandError::new)?;
                command_result("toggle block", toggle_block(editor, ty, level))
            })
            .description("Switch the selected blocks to a type, or back to paragraphs.")
            .keywords(["block", "heading", "quote", "list", "code", "paragraph"])
            .args_example(serde_json::json!({ "type": "heading", "level": 2 })),
            CommandSpec::new("align.set", "Set alignment", |editor, args| {
                let align = parse_align_arg(args.as_ref())?;
                command_result("set alignment", set_block_align(editor, align))
            })
            .description("Align the selected blocks; null clears the alignment.")
            .keywords(["align", "left", "center", "right", "justify"])
            .args_example(serde_json::json!({ "align": "center" })),
        ]
    }

    fn queries(&self) -> Vec<QuerySpec> {
        vec![
            QuerySpec::new("block.is_active", |editor, args| {
                let (ty, level) = block_args(args.as_ref()).map_err(QueryError::new)?;
                Ok(Value::Bool(is_block_active(editor, ty, level)))
            }),
            QuerySpec::new("align.current", |editor, _args| {
                Ok(get_block_align(editor).map_or(Value::Null, |a| Value::from(a.as_str())))
            }),
        ]
    }
}
