use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::core::{Point, Selection};
use crate::path::{self, Path};
use crate::schema::{ElementKind, Marks, Node};

/// Properties given to the right half of a split, so that a merge of two
/// differently-formatted siblings can be inverted exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeProps {
    Marks(Marks),
    Kind(ElementKind),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    InsertText {
        #[serde(default)]
        path: Path,
        offset: usize,
        text: String,
    },
    RemoveText {
        #[serde(default)]
        path: Path,
        range: Range<usize>,
    },
    InsertNode {
        #[serde(default)]
        path: Path,
        node: Node,
    },
    RemoveNode {
        #[serde(default)]
        path: Path,
    },
    /// Splits a run at a byte offset, or an element before a child index.
    /// The right half is inserted at the next sibling path.
    SplitNode {
        #[serde(default)]
        path: Path,
        position: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<NodeProps>,
    },
    /// Merges the node at `path` into its previous sibling. `position` is the
    /// previous sibling's length (bytes for runs, children for elements).
    MergeNode {
        #[serde(default)]
        path: Path,
        position: usize,
    },
    /// Moves a node. `to` addresses the destination in the tree as it is
    /// after the node has been taken out.
    MoveNode {
        #[serde(default)]
        path: Path,
        to: Path,
    },
    SetElement {
        #[serde(default)]
        path: Path,
        kind: ElementKind,
    },
    SetMarks {
        #[serde(default)]
        path: Path,
        marks: Marks,
    },
}

impl Op {
    pub fn path(&self) -> &[usize] {
        match self {
            Op::InsertText { path, .. }
            | Op::RemoveText { path, .. }
            | Op::InsertNode { path, .. }
            | Op::RemoveNode { path }
            | Op::SplitNode { path, .. }
            | Op::MergeNode { path, .. }
            | Op::MoveNode { path, .. }
            | Op::SetElement { path, .. }
            | Op::SetMarks { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub ops: Vec<Op>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_after: Option<Selection>,
    #[serde(default)]
    pub meta: TransactionMeta,
}

impl Transaction {
    pub fn new(ops: Vec<Op>) -> Self {
        Self {
            ops,
            selection_after: None,
            meta: TransactionMeta::default(),
        }
    }

    pub fn selection_after(mut self, selection_after: Selection) -> Self {
        self.selection_after = Some(selection_after);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.meta.source = Some(source.into());
        self
    }
}

fn shift_for_insert(p: &mut Path, at: &[usize]) {
    let Some((&ix, parent)) = at.split_last() else {
        return;
    };
    let depth = parent.len();
    if p.len() > depth && p.starts_with(parent) && p[depth] >= ix {
        p[depth] += 1;
    }
}

/// Returns false when `p` lived inside the removed node.
fn shift_for_remove(p: &mut Path, at: &[usize]) -> bool {
    if path::is_at_or_below(at, p) {
        return false;
    }
    if path::ends_before(at, p) {
        p[at.len() - 1] -= 1;
    }
    true
}

/// Where the node at `path` lives after `op`, or `None` if `op` removed it.
/// For a split node the left half keeps the original path.
pub fn transform_path(p: &[usize], op: &Op) -> Option<Path> {
    let mut p = p.to_vec();
    match op {
        Op::InsertText { .. }
        | Op::RemoveText { .. }
        | Op::SetElement { .. }
        | Op::SetMarks { .. } => {}
        Op::InsertNode { path: at, .. } => shift_for_insert(&mut p, at),
        Op::RemoveNode { path: at } => {
            if !shift_for_remove(&mut p, at) {
                return None;
            }
        }
        Op::SplitNode {
            path: at, position, ..
        } => {
            let depth = at.len();
            if depth == 0 {
                return Some(p);
            }
            if path::is_ancestor(at, &p) {
                if p[depth] >= *position {
                    p[depth - 1] += 1;
                    p[depth] -= position;
                }
            } else if path::ends_before(at, &p) {
                p[depth - 1] += 1;
            }
        }
        Op::MergeNode { path: at, position } => {
            let depth = at.len();
            if depth == 0 {
                return Some(p);
            }
            if *at == p || path::ends_before(at, &p) {
                p[depth - 1] -= 1;
            } else if path::is_ancestor(at, &p) {
                p[depth - 1] -= 1;
                p[depth] += position;
            }
        }
        Op::MoveNode { path: from, to } => {
            if path::is_at_or_below(from, &p) {
                let mut moved = to.clone();
                moved.extend_from_slice(&p[from.len()..]);
                return Some(moved);
            }
            shift_for_remove(&mut p, from);
            shift_for_insert(&mut p, to);
        }
    }
    Some(p)
}

/// Carries a point through `op`. Returns `None` when the run it addressed
/// was removed.
pub fn transform_point(point: &Point, op: &Op) -> Option<Point> {
    let mut point = point.clone();
    match op {
        Op::InsertText { path, offset, text } if *path == point.path => {
            if point.offset >= *offset {
                point.offset += text.len();
            }
            Some(point)
        }
        Op::RemoveText { path, range } if *path == point.path => {
            if point.offset > range.start {
                if point.offset >= range.end {
                    point.offset -= range.end - range.start;
                } else {
                    point.offset = range.start;
                }
            }
            Some(point)
        }
        Op::SplitNode { path, position, .. } if *path == point.path => {
            if point.offset >= *position {
                point.offset -= position;
                point.path = path::next(path);
            }
            Some(point)
        }
        Op::MergeNode { path, position } if *path == point.path => {
            point.path = path::previous(path)?;
            point.offset += position;
            Some(point)
        }
        _ => {
            point.path = transform_path(&point.path, op)?;
            Some(point)
        }
    }
}
