//! Compound tree edits built from primitive ops: split, wrap, unwrap, lift,
//! insert and delete. Every function here expects to run inside (or opens)
//! an [`Editor::batch`], so a whole compound edit undoes as one step.

use std::cmp::Ordering;

use crate::core::{Editor, Point, Selection};
use crate::error::ApplyError;
use crate::ops::{Op, transform_path};
use crate::path::{self, Path};
use crate::query::{self, Affinity};
use crate::schema::{Element, ElementKind, Node, Text};

pub fn select_point(editor: &mut Editor, point: Point) {
    editor.set_selection_raw(Some(Selection::collapsed(point)));
}

pub fn select_start(editor: &mut Editor, path: &[usize]) {
    if let Some(point) = query::start_point(editor.doc(), path) {
        select_point(editor, point);
    }
}

pub fn select_end(editor: &mut Editor, path: &[usize]) {
    if let Some(point) = query::end_point(editor.doc(), path) {
        select_point(editor, point);
    }
}

pub fn set_element(editor: &mut Editor, path: &[usize], kind: ElementKind) -> Result<(), ApplyError> {
    match query::element_at_path(editor.doc(), path) {
        Some(el) if el.kind == kind => Ok(()),
        Some(_) => editor.apply_op(Op::SetElement {
            path: path.to_vec(),
            kind,
        }),
        None => Err(ApplyError::InvalidPath(format!("No element at {path:?}"))),
    }
}

/// Splits the run under `point` and every ancestor up to and including the
/// node at `top`. Returns the path where content after the point now
/// starts, at `top`'s depth. With `always = false` nothing is split when the
/// point sits at either edge of `top`.
pub fn split_at_point(
    editor: &mut Editor,
    point: &Point,
    top: &[usize],
    always: bool,
) -> Result<Path, ApplyError> {
    if !path::is_at_or_below(top, &point.path) {
        return Err(ApplyError::InvalidPath(format!(
            "{top:?} is not an ancestor of {:?}",
            point.path
        )));
    }

    if !always {
        if query::end_point(editor.doc(), top).as_ref() == Some(point) {
            return Ok(path::next(top));
        }
        if query::start_point(editor.doc(), top).as_ref() == Some(point) {
            return Ok(top.to_vec());
        }
    }

    let mut position = point.offset;
    let mut current = point.path.clone();
    loop {
        editor.apply_op(Op::SplitNode {
            path: current.clone(),
            position,
            right: None,
        })?;
        if current.len() == top.len() {
            return Ok(path::next(&current));
        }
        position = path::last_index(&current).unwrap_or(0) + 1;
        current.pop();
    }
}

/// Wraps the sibling range `start..=end` under `parent` in a new element.
/// Returns the wrapper's path.
pub fn wrap_nodes(
    editor: &mut Editor,
    parent: &[usize],
    start: usize,
    end: usize,
    wrapper: ElementKind,
) -> Result<Path, ApplyError> {
    let wrapper_path = path::child(parent, start);
    editor.apply_op(Op::InsertNode {
        path: wrapper_path.clone(),
        node: Node::Element(Element::new(wrapper, Vec::new())),
    })?;
    for k in 0..=end.saturating_sub(start) {
        editor.apply_op(Op::MoveNode {
            path: path::child(parent, start + 1),
            to: path::child(&wrapper_path, k),
        })?;
    }
    Ok(wrapper_path)
}

/// Replaces the element at `path` with its children.
pub fn unwrap_node(editor: &mut Editor, target: &[usize]) -> Result<(), ApplyError> {
    let count = query::children_at_path(editor.doc(), target)
        .map(<[Node]>::len)
        .ok_or_else(|| ApplyError::InvalidPath(format!("No element at {target:?}")))?;
    let parent = path::parent(target).to_vec();
    let index = path::last_index(target)
        .ok_or_else(|| ApplyError::InvalidPath("Cannot unwrap the root".into()))?;
    for k in 0..count {
        editor.apply_op(Op::MoveNode {
            path: path::child(target, 0),
            to: path::child(&parent, index + 1 + k),
        })?;
    }
    editor.apply_op(Op::RemoveNode {
        path: target.to_vec(),
    })
}

/// Unwraps only the children `start..=end` of the element at `target`,
/// splitting it so the remaining children stay wrapped.
pub fn unwrap_children(
    editor: &mut Editor,
    target: &[usize],
    start: usize,
    end: usize,
) -> Result<(), ApplyError> {
    let count = query::children_at_path(editor.doc(), target)
        .map(<[Node]>::len)
        .ok_or_else(|| ApplyError::InvalidPath(format!("No element at {target:?}")))?;
    if end + 1 < count {
        editor.apply_op(Op::SplitNode {
            path: target.to_vec(),
            position: end + 1,
            right: None,
        })?;
    }
    let middle = if start > 0 {
        editor.apply_op(Op::SplitNode {
            path: target.to_vec(),
            position: start,
            right: None,
        })?;
        path::next(target)
    } else {
        target.to_vec()
    };
    unwrap_node(editor, &middle)
}

/// Moves a node one level up, out of its parent, splitting the parent when
/// the node sits between other children. Returns the node's new path.
pub fn lift_node(editor: &mut Editor, target: &[usize]) -> Result<Path, ApplyError> {
    if target.len() < 2 {
        return Err(ApplyError::InvalidPath(format!(
            "{target:?} has no parent to lift out of"
        )));
    }
    let parent = path::parent(target).to_vec();
    let index = path::last_index(target).unwrap_or(0);
    let count = query::children_at_path(editor.doc(), &parent)
        .map(<[Node]>::len)
        .unwrap_or(0);

    if count == 1 {
        unwrap_node(editor, &parent)?;
        Ok(parent)
    } else if index == 0 {
        editor.apply_op(Op::MoveNode {
            path: target.to_vec(),
            to: parent.clone(),
        })?;
        Ok(parent)
    } else if index + 1 == count {
        let to = path::next(&parent);
        editor.apply_op(Op::MoveNode {
            path: target.to_vec(),
            to: to.clone(),
        })?;
        Ok(to)
    } else {
        editor.apply_op(Op::SplitNode {
            path: parent.clone(),
            position: index + 1,
            right: None,
        })?;
        let to = path::next(&parent);
        editor.apply_op(Op::MoveNode {
            path: target.to_vec(),
            to: to.clone(),
        })?;
        Ok(to)
    }
}

/// Inserts nodes at the selection. Block nodes split the enclosing block
/// (or land beside it when the caret sits at an edge); text and inline
/// elements split the run under the caret. The caret ends up at the end of
/// the last inserted node.
pub fn insert_nodes(editor: &mut Editor, nodes: Vec<Node>) -> Result<(), ApplyError> {
    if nodes.is_empty() {
        return Ok(());
    }
    editor.batch(|editor| {
        let inline = match &nodes[0] {
            Node::Text(_) => true,
            Node::Element(el) => editor.is_inline(el),
        };
        let mut nodes = nodes;

        let at = match insertion_point(editor)? {
            None => {
                if inline {
                    nodes = vec![Node::element(ElementKind::paragraph(), nodes)];
                }
                vec![editor.doc().children.len()]
            }
            Some(mut point) => {
                let void = editor
                    .void_above(path::parent(&point.path))
                    .map(|(p, el)| (p, editor.is_inline(el)));
                match void {
                    Some((void_path, false)) => {
                        if inline {
                            nodes = vec![Node::element(ElementKind::paragraph(), nodes)];
                        }
                        path::next(&void_path)
                    }
                    Some((void_path, true)) => {
                        if let Some(after) = query::point_after(editor.doc(), &void_path) {
                            point = after;
                        }
                        split_for_insert(editor, &point, inline)?
                    }
                    None => split_for_insert(editor, &point, inline)?,
                }
            }
        };

        let mut target = at;
        let mut last = target.clone();
        for node in nodes {
            editor.apply_op(Op::InsertNode {
                path: target.clone(),
                node,
            })?;
            last = target.clone();
            target = path::next(&target);
        }
        select_end(editor, &last);
        Ok(())
    })
}

fn split_for_insert(editor: &mut Editor, point: &Point, inline: bool) -> Result<Path, ApplyError> {
    if inline {
        return split_at_point(editor, point, &point.path, false);
    }
    let (block, _) = editor
        .block_above(path::parent(&point.path))
        .ok_or_else(|| ApplyError::InvalidPath("Caret outside any block".into()))?;
    split_at_point(editor, point, &block, false)
}

/// Collapses an expanded selection by deleting it. Returns the caret.
fn insertion_point(editor: &mut Editor) -> Result<Option<Point>, ApplyError> {
    let Some(selection) = editor.selection().cloned() else {
        return Ok(None);
    };
    if selection.is_collapsed() {
        return Ok(Some(selection.anchor));
    }
    delete_selection(editor)?;
    Ok(editor.selection().map(|sel| sel.anchor.clone()))
}

pub fn delete_selection(editor: &mut Editor) -> Result<(), ApplyError> {
    let Some(selection) = editor.selection().cloned() else {
        return Ok(());
    };
    let (start, end) = selection.ordered();
    delete_range(editor, &start, &end)
}

/// Deletes the content between two points. Runs at the edges are trimmed,
/// nodes fully inside are removed, and when the points sit in different
/// blocks the end block is merged into the start block.
pub fn delete_range(editor: &mut Editor, start: &Point, end: &Point) -> Result<(), ApplyError> {
    if start == end {
        return Ok(());
    }
    editor.batch(|editor| {
        if start.path == end.path {
            editor.apply_op(Op::RemoveText {
                path: start.path.clone(),
                range: start.offset..end.offset,
            })?;
            select_point(editor, start.clone());
            return Ok(());
        }

        let start_block = editor.block_above(path::parent(&start.path)).map(|(p, _)| p);
        let end_block = editor.block_above(path::parent(&end.path)).map(|(p, _)| p);

        let mut applied: Vec<Op> = Vec::new();

        let end_text_len = query::text_at_path(editor.doc(), &end.path)
            .map(|t| t.text.len())
            .unwrap_or(0);
        if end.offset > 0 && end_text_len > 0 {
            let op = Op::RemoveText {
                path: end.path.clone(),
                range: 0..end.offset,
            };
            editor.apply_op(op.clone())?;
            applied.push(op);
        }
        let start_text_len = query::text_at_path(editor.doc(), &start.path)
            .map(|t| t.text.len())
            .unwrap_or(0);
        if start.offset < start_text_len {
            let op = Op::RemoveText {
                path: start.path.clone(),
                range: start.offset..start_text_len,
            };
            editor.apply_op(op.clone())?;
            applied.push(op);
        }

        let mut between = Vec::new();
        collect_between(&editor.doc().children, &mut Vec::new(), start, end, &mut between);
        for victim in between.into_iter().rev() {
            let op = Op::RemoveNode { path: victim };
            editor.apply_op(op.clone())?;
            applied.push(op);
        }

        if let (Some(start_block), Some(end_block)) = (start_block, end_block) {
            let end_block = applied
                .iter()
                .try_fold(end_block, |p, op| transform_path(&p, op));
            if let Some(end_block) = end_block {
                if end_block != start_block {
                    merge_blocks(editor, &start_block, &end_block)?;
                }
            }
        }

        select_point(editor, start.clone());
        Ok(())
    })
}

fn collect_between(
    children: &[Node],
    prefix: &mut Path,
    start: &Point,
    end: &Point,
    out: &mut Vec<Path>,
) {
    for (ix, node) in children.iter().enumerate() {
        prefix.push(ix);
        let holds_edge = path::is_at_or_below(prefix, &start.path)
            || path::is_at_or_below(prefix, &end.path);
        if holds_edge {
            if let Node::Element(el) = node {
                collect_between(&el.children, prefix, start, end, out);
            }
        } else if path::compare(prefix, &start.path) == Ordering::Greater
            && path::compare(prefix, &end.path) == Ordering::Less
        {
            out.push(prefix.clone());
        }
        prefix.pop();
    }
}

/// Moves `end_block` next to `start_block` when needed, merges it in, and
/// removes the containers it leaves empty.
fn merge_blocks(editor: &mut Editor, start_block: &[usize], end_block: &[usize]) -> Result<(), ApplyError> {
    let target = path::next(start_block);
    let mut old_ancestors: Vec<Path> = Vec::new();
    if end_block != target.as_slice() {
        for len in (1..end_block.len()).rev() {
            old_ancestors.push(end_block[..len].to_vec());
        }
        let op = Op::MoveNode {
            path: end_block.to_vec(),
            to: target.clone(),
        };
        editor.apply_op(op.clone())?;
        old_ancestors = old_ancestors
            .into_iter()
            .filter_map(|p| transform_path(&p, &op))
            .collect();
    }

    let position = query::children_at_path(editor.doc(), start_block)
        .map(<[Node]>::len)
        .unwrap_or(0);
    editor.apply_op(Op::MergeNode {
        path: target,
        position,
    })?;

    for ancestor in old_ancestors {
        let Some(ancestor) = transform_path(
            &ancestor,
            &Op::MergeNode {
                path: path::next(start_block),
                position,
            },
        ) else {
            continue;
        };
        let empty = query::children_at_path(editor.doc(), &ancestor).is_some_and(<[Node]>::is_empty);
        if !empty {
            break;
        }
        editor.apply_op(Op::RemoveNode { path: ancestor })?;
    }
    Ok(())
}

/// Base text insertion. An expanded selection is deleted first; pending
/// caret marks produce a new run; a caret parked in an inline void types
/// into the run after it.
pub fn insert_text(editor: &mut Editor, text: &str) -> Result<(), ApplyError> {
    if text.is_empty() {
        return Ok(());
    }
    editor.batch(|editor| {
        let pending = editor.pending_marks().cloned();
        let Some(mut point) = insertion_point(editor)? else {
            return Ok(());
        };

        if let Some((void_path, void_el)) = editor.void_above(path::parent(&point.path)) {
            if !editor.is_inline(void_el) {
                return Ok(());
            }
            let Some(after) = query::point_after(editor.doc(), &void_path) else {
                return Ok(());
            };
            point = after;
        }

        let Some(run) = query::text_at_path(editor.doc(), &point.path).cloned() else {
            return Err(ApplyError::InvalidPath(format!("No run at {:?}", point.path)));
        };

        match pending {
            Some(marks) if marks != run.marks => {
                let at = split_at_point(editor, &point, &point.path, false)?;
                editor.apply_op(Op::InsertNode {
                    path: at.clone(),
                    node: Node::Text(Text {
                        text: text.to_string(),
                        marks,
                    }),
                })?;
                select_end(editor, &at);
            }
            _ => {
                editor.apply_op(Op::InsertText {
                    path: point.path.clone(),
                    offset: point.offset,
                    text: text.to_string(),
                })?;
                select_point(editor, Point::new(point.path, point.offset + text.len()));
            }
        }
        Ok(())
    })
}

/// Deletes `len` bytes of block text ending at the caret.
pub fn delete_backward_in_block(editor: &mut Editor, len: usize) -> Result<(), ApplyError> {
    let Some(caret) = editor.selection().map(|sel| sel.focus.clone()) else {
        return Ok(());
    };
    let Some((block, _)) = editor.block_above(path::parent(&caret.path)) else {
        return Ok(());
    };
    let end_offset = editor.offset_in_block(&block, &caret);
    let start_offset = end_offset.saturating_sub(len);
    let Some(start) = editor.point_at_block_offset(&block, start_offset, Affinity::Forward) else {
        return Ok(());
    };
    let end = editor
        .point_at_block_offset(&block, end_offset, Affinity::Backward)
        .unwrap_or(caret);
    delete_range(editor, &start, &end)
}

/// Splits the runs at both edges of a range so the covered text consists of
/// whole runs. Returns the covered runs in document order, void placeholder
/// runs included.
pub fn isolate_range(editor: &mut Editor, start: &Point, end: &Point) -> Result<Vec<Path>, ApplyError> {
    if start == end {
        return Ok(Vec::new());
    }
    let mut first = start.path.clone();
    let mut last = end.path.clone();
    let mut skip_first = false;
    let mut skip_last = false;

    let run_len = |editor: &Editor, run: &[usize]| {
        query::text_at_path(editor.doc(), run).map_or(0, |t| t.text.len())
    };

    if end.offset == 0 && end.path != start.path {
        skip_last = true;
    } else if end.offset < run_len(editor, &end.path) {
        editor.apply_op(Op::SplitNode {
            path: end.path.clone(),
            position: end.offset,
            right: None,
        })?;
    }

    if start.offset > 0 {
        if start.offset >= run_len(editor, &start.path) {
            skip_first = true;
        } else {
            let split = Op::SplitNode {
                path: start.path.clone(),
                position: start.offset,
                right: None,
            };
            editor.apply_op(split.clone())?;
            first = path::next(&start.path);
            last = if last == start.path {
                first.clone()
            } else {
                transform_path(&last, &split).unwrap_or(last)
            };
        }
    }

    Ok(query::texts_between(
        editor.doc(),
        &Point::new(first.clone(), 0),
        &Point::new(last.clone(), 0),
    )
    .into_iter()
    .map(|(p, _)| p)
    .filter(|p| !(skip_first && *p == first) && !(skip_last && *p == last))
    .collect())
}

/// Inserts an inline node at the caret and parks the caret right after it.
pub fn insert_inline(editor: &mut Editor, node: Node) -> Result<(), ApplyError> {
    editor.batch(|editor| {
        insert_nodes(editor, vec![node])?;
        let Some(caret) = editor.selection().map(|sel| sel.focus.clone()) else {
            return Ok(());
        };
        let inline = path::parent(&caret.path).to_vec();
        select_after_inline(editor, &inline)
    })
}

/// Parks the caret at the start of the run following an inline element,
/// creating that run when the element ends its parent or abuts another
/// element.
pub fn select_after_inline(editor: &mut Editor, inline: &[usize]) -> Result<(), ApplyError> {
    let after = path::next(inline);
    if query::text_at_path(editor.doc(), &after).is_none() {
        editor.apply_op(Op::InsertNode {
            path: after.clone(),
            node: Node::text(""),
        })?;
    }
    select_point(editor, Point::new(after, 0));
    Ok(())
}

/// Moves a collapsed caret by `distance` characters, negative meaning
/// backward. Run boundaries inside a block are free; stepping into the
/// next block or over an inline void costs one character. Stops at the
/// document edges.
pub fn move_caret(editor: &mut Editor, distance: isize) {
    let Some(mut point) = editor.selection().map(|sel| sel.focus.clone()) else {
        return;
    };
    let forward = distance >= 0;
    for _ in 0..distance.unsigned_abs() {
        match step_caret(editor, &point, forward) {
            Some(next) => point = next,
            None => break,
        }
    }
    editor.set_selection(Some(Selection::collapsed(point)));
}

fn step_caret(editor: &Editor, point: &Point, forward: bool) -> Option<Point> {
    let doc = editor.doc();
    let in_void = |p: &[usize]| editor.void_above(path::parent(p)).map(|(void, _)| void);
    let block_of = |p: &[usize]| editor.block_above(path::parent(p)).map(|(block, _)| block);

    let run = query::text_at_path(doc, &point.path)?;
    if in_void(&point.path).is_none() {
        if forward && point.offset < run.text.len() {
            let step = run.text[point.offset..].chars().next().map_or(0, char::len_utf8);
            return Some(Point::new(point.path.clone(), point.offset + step));
        }
        if !forward && point.offset > 0 {
            let step = run.text[..point.offset].chars().next_back().map_or(0, char::len_utf8);
            return Some(Point::new(point.path.clone(), point.offset - step));
        }
    }

    let runs = query::texts(doc);
    let here = runs.iter().position(|(p, _)| *p == point.path)?;
    let block = block_of(&point.path);
    let leaving_void = in_void(&point.path);

    let mut ix = here;
    loop {
        ix = if forward { ix + 1 } else { ix.checked_sub(1)? };
        let (next, text) = runs.get(ix)?;
        if let Some(void) = in_void(next) {
            if leaving_void.as_ref() == Some(&void) {
                continue;
            }
            let inline = query::element_at_path(doc, &void).is_some_and(|el| editor.is_inline(el));
            if inline {
                continue;
            }
            return Some(Point::new(next.clone(), 0));
        }
        let offset = if forward { 0 } else { text.text.len() };
        let candidate = Point::new(next.clone(), offset);
        let crossed_block = block_of(next) != block;
        if crossed_block || leaving_void.is_some() || skipped_void(editor, &runs, here, ix) {
            return Some(candidate);
        }
        return step_caret(editor, &candidate, forward).or(Some(candidate));
    }
}

/// Whether an inline void sits strictly between two run indices.
fn skipped_void(editor: &Editor, runs: &[(Path, &Text)], a: usize, b: usize) -> bool {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    runs[lo + 1..hi]
        .iter()
        .any(|(p, _)| editor.void_above(path::parent(p)).is_some())
}
