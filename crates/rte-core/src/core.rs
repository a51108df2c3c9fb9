use std::cmp::Ordering;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EditorConfig;
use crate::error::{ApplyError, CommandError, PathError, QueryError};
use crate::ops::{NodeProps, Op, Transaction, transform_point};
use crate::path::{self, Path};
use crate::plugin::{EditorPlugin, PasteData, PluginRegistry};
use crate::query;
use crate::schema::{Document, Element, Marks, Node, Text};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }

    pub fn compare(&self, other: &Point) -> Ordering {
        match path::compare(&self.path, &other.path) {
            Ordering::Equal => self.offset.cmp(&other.offset),
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_backward(&self) -> bool {
        self.anchor.compare(&self.focus) == Ordering::Greater
    }

    /// `(start, end)` in document order.
    pub fn ordered(&self) -> (Point, Point) {
        if self.is_backward() {
            (self.focus.clone(), self.anchor.clone())
        } else {
            (self.anchor.clone(), self.focus.clone())
        }
    }

    pub fn start(&self) -> Point {
        self.ordered().0
    }

    pub fn end(&self) -> Point {
        self.ordered().1
    }
}

#[derive(Debug, Clone)]
pub struct UndoRecord {
    pub inverse_ops: Vec<Op>,
    pub selection_before: Option<Selection>,
    pub selection_after: Option<Selection>,
}

#[derive(Debug, Clone)]
pub struct TransactionPreview {
    pub doc: Document,
    pub selection: Option<Selection>,
}

struct Batch {
    inverse_ops: Vec<Op>,
    selection_before: Option<Selection>,
}

pub struct Editor {
    doc: Document,
    selection: Option<Selection>,
    pending_marks: Option<Marks>,
    registry: PluginRegistry,
    config: EditorConfig,
    undo_stack: Vec<UndoRecord>,
    redo_stack: Vec<UndoRecord>,
    batch: Option<Batch>,
}

impl Editor {
    pub fn new(doc: Document, selection: Option<Selection>, registry: PluginRegistry) -> Self {
        Self::with_config(doc, selection, registry, EditorConfig::default())
    }

    pub fn with_config(
        doc: Document,
        selection: Option<Selection>,
        registry: PluginRegistry,
        config: EditorConfig,
    ) -> Self {
        let mut editor = Self {
            doc,
            selection,
            pending_marks: None,
            registry,
            config: config.with_defaults(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            batch: None,
        };
        editor.normalize_in_place();
        editor
    }

    pub fn with_core_plugins() -> Self {
        let selection = Selection::collapsed(Point::new(vec![0, 0], 0));
        Self::new(Document::default(), Some(selection), PluginRegistry::core())
    }

    pub fn with_richtext_plugins() -> Self {
        let selection = Selection::collapsed(Point::new(vec![0, 0], 0));
        Self::new(
            Document::default(),
            Some(selection),
            PluginRegistry::richtext(),
        )
    }

    /// A rich-text session over `doc` with the caret at the document start.
    pub fn from_document(doc: Document) -> Self {
        let selection = query::first_text_point(&doc).map(Selection::collapsed);
        Self::new(doc, selection, PluginRegistry::richtext())
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        if self.selection != selection {
            self.pending_marks = None;
        }
        self.selection = selection;
        self.normalize_selection_in_place();
    }

    pub fn select(&mut self, selection: Selection) {
        self.set_selection(Some(selection));
    }

    pub fn deselect(&mut self) {
        self.set_selection(None);
    }

    /// Swaps in a new document wholesale. History does not survive the swap.
    pub fn replace_document(&mut self, doc: Document) {
        self.doc = doc;
        self.selection = None;
        self.pending_marks = None;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.normalize_in_place();
        self.selection = query::first_text_point(&self.doc).map(Selection::collapsed);
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn pending_marks(&self) -> Option<&Marks> {
        self.pending_marks.as_ref()
    }

    pub(crate) fn set_pending_marks(&mut self, marks: Option<Marks>) {
        self.pending_marks = marks;
    }

    pub(crate) fn take_pending_marks(&mut self) -> Option<Marks> {
        self.pending_marks.take()
    }

    pub fn is_inline(&self, element: &Element) -> bool {
        self.registry.is_inline(&element.kind)
    }

    pub fn is_void(&self, element: &Element) -> bool {
        self.registry.is_void(&element.kind)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        let Some(record) = self.undo_stack.pop() else {
            return false;
        };

        let UndoRecord {
            inverse_ops,
            selection_before,
            selection_after,
        } = record;

        let mut redo_ops: Vec<Op> = Vec::new();
        for op in inverse_ops.iter().cloned() {
            match self.apply_op_raw(op) {
                Ok(inv) => redo_ops.push(inv),
                Err(err) => {
                    tracing::warn!(%err, "undo stopped on an inverse op that no longer applies");
                    break;
                }
            }
        }
        redo_ops.reverse();

        self.selection = selection_before.clone();
        self.pending_marks = None;
        self.normalize_in_place();

        self.redo_stack.push(UndoRecord {
            selection_before,
            selection_after,
            inverse_ops: redo_ops,
        });
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(record) = self.redo_stack.pop() else {
            return false;
        };

        let UndoRecord {
            inverse_ops,
            selection_before,
            selection_after,
        } = record;

        let mut undo_ops: Vec<Op> = Vec::new();
        for op in inverse_ops.iter().cloned() {
            match self.apply_op_raw(op) {
                Ok(inv) => undo_ops.push(inv),
                Err(err) => {
                    tracing::warn!(%err, "redo stopped on an op that no longer applies");
                    break;
                }
            }
        }
        undo_ops.reverse();

        self.selection = selection_after.clone();
        self.pending_marks = None;
        self.normalize_in_place();

        self.undo_stack.push(UndoRecord {
            selection_before,
            selection_after,
            inverse_ops: undo_ops,
        });
        true
    }

    pub fn apply(&mut self, tx: Transaction) -> Result<(), ApplyError> {
        if let Some(source) = &tx.meta.source {
            tracing::trace!(source = source.as_str(), ops = tx.ops.len(), "apply transaction");
        }
        self.batch(|editor| {
            for op in tx.ops {
                editor.apply_op(op)?;
            }
            if let Some(sel) = tx.selection_after {
                editor.selection = Some(sel);
            }
            Ok(())
        })
    }

    /// Runs several primitive edits as one undoable step. Normalization is
    /// deferred until the outermost batch finishes; on error every op applied
    /// inside the batch is rolled back.
    pub fn batch<R>(
        &mut self,
        f: impl FnOnce(&mut Editor) -> Result<R, ApplyError>,
    ) -> Result<R, ApplyError> {
        if self.batch.is_some() {
            return f(self);
        }

        self.batch = Some(Batch {
            inverse_ops: Vec::new(),
            selection_before: self.selection.clone(),
        });

        let result = f(self).and_then(|value| {
            self.normalize_recorded()?;
            Ok(value)
        });

        let Some(batch) = self.batch.take() else {
            return result;
        };

        match result {
            Ok(value) => {
                self.normalize_selection_in_place();
                let Batch {
                    mut inverse_ops,
                    selection_before,
                } = batch;
                if inverse_ops.is_empty() && selection_before == self.selection {
                    return Ok(value);
                }
                self.pending_marks = None;
                if inverse_ops.is_empty() {
                    return Ok(value);
                }
                inverse_ops.reverse();
                self.undo_stack.push(UndoRecord {
                    inverse_ops,
                    selection_before,
                    selection_after: self.selection.clone(),
                });
                self.redo_stack.clear();
                if self.undo_stack.len() > self.config.max_undo {
                    self.undo_stack.remove(0);
                }
                Ok(value)
            }
            Err(err) => {
                for op in batch.inverse_ops.into_iter().rev() {
                    if let Err(rollback) = self.apply_op_raw(op) {
                        tracing::warn!(%rollback, "rollback op failed");
                        break;
                    }
                }
                self.selection = batch.selection_before;
                self.normalize_selection_in_place();
                Err(err)
            }
        }
    }

    /// Applies one primitive op, recording its inverse in the open batch.
    pub fn apply_op(&mut self, op: Op) -> Result<(), ApplyError> {
        if self.batch.is_none() {
            return self.batch(|editor| editor.apply_op(op));
        }
        let inverse = self.apply_op_raw(op)?;
        if let Some(batch) = self.batch.as_mut() {
            batch.inverse_ops.push(inverse);
        }
        Ok(())
    }

    /// Moves the selection inside an open batch without recording an op.
    pub(crate) fn set_selection_raw(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    pub fn preview_transaction(&self, tx: &Transaction) -> Result<TransactionPreview, ApplyError> {
        let mut doc = self.doc.clone();
        let mut selection = self.selection.clone();

        for op in tx.ops.iter().cloned() {
            apply_op_to(&mut doc, &mut selection, op)?;
        }

        if let Some(sel) = &tx.selection_after {
            selection = Some(sel.clone());
        }

        let mut converged = false;
        for _ in 0..self.config.max_normalize_iterations {
            let ops = self.registry.normalize(&doc);
            if ops.is_empty() {
                converged = true;
                break;
            }
            for op in ops {
                apply_op_to(&mut doc, &mut selection, op)?;
            }
        }

        if !converged {
            return Err(ApplyError::NormalizeDidNotConverge);
        }

        let selection = selection.map(|sel| normalize_selection(&doc, &sel));
        Ok(TransactionPreview { doc, selection })
    }

    pub fn run_command(&mut self, id: &str, args: Option<Value>) -> Result<(), CommandError> {
        let Some(command) = self.registry.command(id) else {
            return Err(CommandError::new(format!("Unknown command: {id}")));
        };
        (command.handler)(self, args)
    }

    pub fn run_query_json(&self, id: &str, args: Option<Value>) -> Result<Value, QueryError> {
        let Some(query) = self.registry.query(id) else {
            return Err(QueryError::new(format!("Unknown query: {id}")));
        };
        (query.handler)(self, args)
    }

    pub fn run_query<T>(&self, id: &str, args: Option<Value>) -> Result<T, QueryError>
    where
        T: DeserializeOwned,
    {
        let value = self.run_query_json(id, args)?;
        serde_json::from_value(value)
            .map_err(|err| QueryError::new(format!("Failed to decode query result: {err}")))
    }

    /// Typed-input entry point. Plugins see the text first, most recently
    /// registered first; the base insertion runs when none handles it.
    pub fn insert_text(&mut self, text: &str) -> Result<(), ApplyError> {
        let plugins: Vec<Arc<dyn EditorPlugin>> = self.registry.plugins().to_vec();
        self.batch(|editor| {
            for plugin in plugins.iter().rev() {
                if plugin.insert_text(editor, text)?.is_handled() {
                    tracing::trace!(plugin = plugin.id(), "insert_text handled");
                    return Ok(());
                }
            }
            crate::transforms::insert_text(editor, text)
        })
    }

    /// Paste entry point, dispatched like [`Editor::insert_text`]. The base
    /// behavior inserts the plain-text payload.
    pub fn insert_data(&mut self, data: &PasteData) -> Result<(), ApplyError> {
        let plugins: Vec<Arc<dyn EditorPlugin>> = self.registry.plugins().to_vec();
        self.batch(|editor| {
            for plugin in plugins.iter().rev() {
                if plugin.insert_data(editor, data)?.is_handled() {
                    tracing::trace!(plugin = plugin.id(), "insert_data handled");
                    return Ok(());
                }
            }
            match data.text.as_deref() {
                Some(text) if !text.is_empty() => crate::transforms::insert_text(editor, text),
                _ => Ok(()),
            }
        })
    }

    fn normalize_in_place(&mut self) {
        if let Err(err) = self.normalize_unrecorded() {
            tracing::warn!(%err, "document normalization failed");
        }
        self.normalize_selection_in_place();
    }

    fn normalize_selection_in_place(&mut self) {
        if let Some(sel) = &self.selection {
            self.selection = Some(normalize_selection(&self.doc, sel));
        }
    }

    fn normalize_unrecorded(&mut self) -> Result<(), ApplyError> {
        for _ in 0..self.config.max_normalize_iterations {
            let ops = self.registry.normalize(&self.doc);
            if ops.is_empty() {
                return Ok(());
            }
            for op in ops {
                self.apply_op_raw(op)?;
            }
        }
        tracing::warn!("normalization did not converge");
        Err(ApplyError::NormalizeDidNotConverge)
    }

    fn normalize_recorded(&mut self) -> Result<(), ApplyError> {
        for _ in 0..self.config.max_normalize_iterations {
            let ops = self.registry.normalize(&self.doc);
            if ops.is_empty() {
                return Ok(());
            }
            for op in ops {
                self.apply_op(op)?;
            }
        }
        tracing::warn!("normalization did not converge");
        Err(ApplyError::NormalizeDidNotConverge)
    }

    fn apply_op_raw(&mut self, op: Op) -> Result<Op, ApplyError> {
        apply_op_to(&mut self.doc, &mut self.selection, op)
    }
}

fn apply_op_to(
    doc: &mut Document,
    selection: &mut Option<Selection>,
    op: Op,
) -> Result<Op, ApplyError> {
    match op {
        Op::InsertText { path, offset, text } => {
            let text_node = text_mut(doc, &path)?;
            let offset = clamp_to_char_boundary(&text_node.text, offset);
            text_node.text.insert_str(offset, &text);
            let len = text.len();
            let applied = Op::InsertText {
                path: path.clone(),
                offset,
                text,
            };
            transform_selection(doc, selection, &applied);
            Ok(Op::RemoveText {
                path,
                range: offset..offset + len,
            })
        }
        Op::RemoveText { path, range } => {
            let text_node = text_mut(doc, &path)?;
            let start = clamp_to_char_boundary(&text_node.text, range.start);
            let end = clamp_to_char_boundary(&text_node.text, range.end);
            if start >= end {
                return Ok(Op::InsertText {
                    path,
                    offset: start,
                    text: String::new(),
                });
            }
            let removed = text_node.text[start..end].to_string();
            text_node.text.replace_range(start..end, "");
            let applied = Op::RemoveText {
                path: path.clone(),
                range: start..end,
            };
            transform_selection(doc, selection, &applied);
            Ok(Op::InsertText {
                path,
                offset: start,
                text: removed,
            })
        }
        Op::InsertNode { path, node } => {
            insert_node(doc, &path, node)?;
            transform_selection(
                doc,
                selection,
                &Op::InsertNode {
                    path: path.clone(),
                    node: Node::text(""),
                },
            );
            Ok(Op::RemoveNode { path })
        }
        Op::RemoveNode { path } => {
            let removed = remove_node(doc, &path)?;
            transform_selection(doc, selection, &Op::RemoveNode { path: path.clone() });
            Ok(Op::InsertNode {
                path,
                node: removed,
            })
        }
        Op::SplitNode {
            path,
            position,
            right,
        } => {
            let right_path = path::next(&path);
            let (position, right_node) = match node_mut(doc, &path)? {
                Node::Text(t) => {
                    let position = clamp_to_char_boundary(&t.text, position);
                    let tail = t.text.split_off(position);
                    let marks = match right {
                        Some(NodeProps::Marks(marks)) => marks,
                        _ => t.marks.clone(),
                    };
                    (position, Node::Text(Text { text: tail, marks }))
                }
                Node::Element(el) => {
                    if position > el.children.len() {
                        return Err(ApplyError::InvalidPath(format!(
                            "Split position out of bounds: {position} > {}",
                            el.children.len()
                        )));
                    }
                    let tail = el.children.split_off(position);
                    let kind = match right {
                        Some(NodeProps::Kind(kind)) => kind,
                        _ => el.kind.clone(),
                    };
                    (position, Node::Element(Element::new(kind, tail)))
                }
            };
            insert_node(doc, &right_path, right_node)?;
            let applied = Op::SplitNode {
                path: path.clone(),
                position,
                right: None,
            };
            transform_selection(doc, selection, &applied);
            Ok(Op::MergeNode {
                path: right_path,
                position,
            })
        }
        Op::MergeNode { path, .. } => {
            let prev_path = path::previous(&path)
                .ok_or_else(|| PathError("Merge target has no previous sibling".into()))?;
            match (node_ref(doc, &prev_path), node_ref(doc, &path)) {
                (Some(Node::Text(_)), Some(Node::Text(_)))
                | (Some(Node::Element(_)), Some(Node::Element(_))) => {}
                _ => {
                    return Err(ApplyError::InvalidPath(
                        "Merge requires two siblings of the same node class".into(),
                    ));
                }
            }
            let removed = remove_node(doc, &path)?;
            let (position, props) = match (node_mut(doc, &prev_path)?, removed) {
                (Node::Text(prev), Node::Text(right)) => {
                    let position = prev.text.len();
                    prev.text.push_str(&right.text);
                    (position, NodeProps::Marks(right.marks))
                }
                (Node::Element(prev), Node::Element(right)) => {
                    let position = prev.children.len();
                    prev.children.extend(right.children);
                    (position, NodeProps::Kind(right.kind))
                }
                _ => unreachable!("sibling classes checked above"),
            };
            let applied = Op::MergeNode {
                path: path.clone(),
                position,
            };
            transform_selection(doc, selection, &applied);
            Ok(Op::SplitNode {
                path: prev_path,
                position,
                right: Some(props),
            })
        }
        Op::MoveNode { path, to } => {
            if path::is_ancestor(&path, &to) {
                return Err(ApplyError::InvalidPath(
                    "Cannot move a node into itself".into(),
                ));
            }
            let node = remove_node(doc, &path)?;
            if let Err(err) = insert_node(doc, &to, node.clone()) {
                insert_node(doc, &path, node)?;
                return Err(err.into());
            }
            let applied = Op::MoveNode {
                path: path.clone(),
                to: to.clone(),
            };
            transform_selection(doc, selection, &applied);
            Ok(Op::MoveNode { path: to, to: path })
        }
        Op::SetElement { path, kind } => {
            let Node::Element(el) = node_mut(doc, &path)? else {
                return Err(ApplyError::InvalidPath("Text has no element kind".into()));
            };
            let old = std::mem::replace(&mut el.kind, kind);
            Ok(Op::SetElement { path, kind: old })
        }
        Op::SetMarks { path, marks } => {
            let text_node = text_mut(doc, &path)?;
            let old = std::mem::replace(&mut text_node.marks, marks);
            Ok(Op::SetMarks { path, marks: old })
        }
    }
}

fn transform_selection(doc_after: &Document, selection: &mut Option<Selection>, op: &Op) {
    let Some(sel) = selection.as_mut() else {
        return;
    };
    for point in [&mut sel.anchor, &mut sel.focus] {
        match transform_point(point, op) {
            Some(next) => *point = next,
            None => {
                if let Op::RemoveNode { path } = op {
                    if let Some(fallback) = point_after_removal(doc_after, path) {
                        *point = fallback;
                    }
                }
            }
        }
    }
}

/// Nearest surviving run for a point whose run was removed with the node at
/// `removed`: the end of the previous run, or the start of the next one when
/// it shares more ancestry with the removed node.
fn point_after_removal(doc_after: &Document, removed: &[usize]) -> Option<Point> {
    let mut prev: Option<(Path, usize)> = None;
    let mut next: Option<Path> = None;
    for (text_path, text) in query::texts(doc_after) {
        if path::compare(&text_path, removed) == Ordering::Less {
            prev = Some((text_path, text.text.len()));
        } else {
            next = Some(text_path);
            break;
        }
    }

    let prefer_next = match (&prev, &next) {
        (Some((prev_path, _)), Some(next_path)) => {
            if next_path.as_slice() == removed {
                !path::has_previous(next_path)
            } else {
                path::common(prev_path, removed).len() < path::common(next_path, removed).len()
            }
        }
        _ => false,
    };

    match (prev, next) {
        (Some((path, len)), _) if !prefer_next => Some(Point::new(path, len)),
        (_, Some(path)) => Some(Point::new(path, 0)),
        (Some((path, len)), None) => Some(Point::new(path, len)),
        (None, None) => None,
    }
}

/// Clamps both selection points onto existing runs.
pub(crate) fn normalize_selection(doc: &Document, selection: &Selection) -> Selection {
    let fallback = query::first_text_point(doc).unwrap_or(Point {
        path: vec![0],
        offset: 0,
    });

    let anchor = normalize_point_to_existing_text(doc, &selection.anchor).unwrap_or_else(|| {
        normalize_point_to_existing_text(doc, &selection.focus).unwrap_or_else(|| fallback.clone())
    });
    let focus =
        normalize_point_to_existing_text(doc, &selection.focus).unwrap_or_else(|| anchor.clone());

    Selection { anchor, focus }
}

fn normalize_point_to_existing_text(doc: &Document, point: &Point) -> Option<Point> {
    if point.path.is_empty() || doc.children.is_empty() {
        return None;
    }

    let mut resolved_path: Vec<usize> = Vec::new();
    let mut children: &[Node] = &doc.children;

    for &wanted in &point.path {
        if children.is_empty() {
            break;
        }
        let ix = wanted.min(children.len() - 1);
        resolved_path.push(ix);
        match &children[ix] {
            Node::Text(t) => {
                return Some(Point {
                    path: resolved_path,
                    offset: clamp_to_char_boundary(&t.text, point.offset),
                });
            }
            Node::Element(el) => {
                children = &el.children;
            }
        }
    }

    query::start_point(doc, &resolved_path)
}

pub(crate) fn clamp_to_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.min(s.len());
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

fn node_ref<'a>(doc: &'a Document, path: &[usize]) -> Option<&'a Node> {
    query::node_at_path(doc, path)
}

fn node_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut Node, PathError> {
    let Some((&first, rest)) = path.split_first() else {
        return Err(PathError("Empty path".into()));
    };

    let len = doc.children.len();
    let mut node = doc.children.get_mut(first).ok_or_else(|| {
        PathError(format!("Path out of bounds at depth 0: {first} >= {len}"))
    })?;

    for (depth, &ix) in rest.iter().enumerate() {
        node = match node {
            Node::Element(el) => {
                let len = el.children.len();
                el.children.get_mut(ix).ok_or_else(|| {
                    PathError(format!(
                        "Path out of bounds at depth {}: {ix} >= {len}",
                        depth + 1
                    ))
                })?
            }
            Node::Text(_) => {
                return Err(PathError(format!("Text node at depth {depth} has no children")));
            }
        };
    }

    Ok(node)
}

fn text_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut Text, PathError> {
    match node_mut(doc, path)? {
        Node::Text(t) => Ok(t),
        Node::Element(_) => Err(PathError("Expected Text node".into())),
    }
}

fn children_mut<'a>(
    doc: &'a mut Document,
    parent_path: &[usize],
) -> Result<&'a mut Vec<Node>, PathError> {
    if parent_path.is_empty() {
        return Ok(&mut doc.children);
    }
    match node_mut(doc, parent_path)? {
        Node::Element(el) => Ok(&mut el.children),
        Node::Text(_) => Err(PathError("Parent is not a container".into())),
    }
}

fn insert_node(doc: &mut Document, path: &[usize], node: Node) -> Result<(), PathError> {
    let Some((&index, parent_path)) = path.split_last() else {
        return Err(PathError("Empty insert path".into()));
    };
    let children = children_mut(doc, parent_path)?;
    if index > children.len() {
        return Err(PathError(format!(
            "Insert index out of bounds: {index} > {}",
            children.len()
        )));
    }
    children.insert(index, node);
    Ok(())
}

fn remove_node(doc: &mut Document, path: &[usize]) -> Result<Node, PathError> {
    let Some((&index, parent_path)) = path.split_last() else {
        return Err(PathError("Empty remove path".into()));
    };
    let children = children_mut(doc, parent_path)?;
    if index >= children.len() {
        return Err(PathError(format!(
            "Remove index out of bounds: {index} >= {}",
            children.len()
        )));
    }
    Ok(children.remove(index))
}
