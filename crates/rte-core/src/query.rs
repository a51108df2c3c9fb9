use std::cmp::Ordering;

use crate::core::{Editor, Point, Selection};
use crate::path::{self, Path};
use crate::schema::{Document, Element, ElementType, Node, Text};

pub fn node_at_path<'a>(doc: &'a Document, path: &[usize]) -> Option<&'a Node> {
    let (&first, rest) = path.split_first()?;
    let mut node = doc.children.get(first)?;
    for &ix in rest {
        node = match node {
            Node::Element(el) => el.children.get(ix)?,
            Node::Text(_) => return None,
        };
    }
    Some(node)
}

pub fn element_at_path<'a>(doc: &'a Document, path: &[usize]) -> Option<&'a Element> {
    node_at_path(doc, path)?.as_element()
}

pub fn text_at_path<'a>(doc: &'a Document, path: &[usize]) -> Option<&'a Text> {
    node_at_path(doc, path)?.as_text()
}

/// Children of the node at `path`; the empty path addresses the root.
pub fn children_at_path<'a>(doc: &'a Document, path: &[usize]) -> Option<&'a [Node]> {
    if path.is_empty() {
        return Some(&doc.children);
    }
    match node_at_path(doc, path)? {
        Node::Element(el) => Some(&el.children),
        Node::Text(_) => None,
    }
}

fn collect_texts<'a>(children: &'a [Node], path: &mut Path, out: &mut Vec<(Path, &'a Text)>) {
    for (ix, node) in children.iter().enumerate() {
        path.push(ix);
        match node {
            Node::Text(t) => out.push((path.clone(), t)),
            Node::Element(el) => collect_texts(&el.children, path, out),
        }
        path.pop();
    }
}

/// Every run in document order.
pub fn texts(doc: &Document) -> Vec<(Path, &Text)> {
    let mut out = Vec::new();
    collect_texts(&doc.children, &mut Vec::new(), &mut out);
    out
}

/// Runs at or below `path`, in document order.
pub fn texts_under<'a>(doc: &'a Document, path: &[usize]) -> Vec<(Path, &'a Text)> {
    let mut out = Vec::new();
    match node_at_path(doc, path) {
        Some(Node::Text(t)) => out.push((path.to_vec(), t)),
        Some(Node::Element(el)) => collect_texts(&el.children, &mut path.to_vec(), &mut out),
        None => {}
    }
    out
}

/// Runs whose path lies between the two points, inclusive.
pub fn texts_between<'a>(doc: &'a Document, start: &Point, end: &Point) -> Vec<(Path, &'a Text)> {
    texts(doc)
        .into_iter()
        .filter(|(p, _)| {
            path::compare(p, &start.path) != Ordering::Less
                && path::compare(p, &end.path) != Ordering::Greater
        })
        .collect()
}

pub fn first_text_point(doc: &Document) -> Option<Point> {
    texts(doc)
        .into_iter()
        .next()
        .map(|(path, _)| Point::new(path, 0))
}

pub fn start_point(doc: &Document, path: &[usize]) -> Option<Point> {
    texts_under(doc, path)
        .into_iter()
        .next()
        .map(|(path, _)| Point::new(path, 0))
}

pub fn end_point(doc: &Document, path: &[usize]) -> Option<Point> {
    texts_under(doc, path)
        .into_iter()
        .last()
        .map(|(path, t)| Point::new(path, t.text.len()))
}

/// First run that starts after the node at `path` ends.
pub fn point_after(doc: &Document, path: &[usize]) -> Option<Point> {
    texts(doc)
        .into_iter()
        .find(|(p, _)| path::compare(p, path) == Ordering::Greater)
        .map(|(p, _)| Point::new(p, 0))
}

/// Nearest element at or above `path` that satisfies `pred`.
pub fn closest_element<'a>(
    doc: &'a Document,
    path: &[usize],
    pred: impl Fn(&Element) -> bool,
) -> Option<(Path, &'a Element)> {
    for len in (1..=path.len()).rev() {
        let candidate = &path[..len];
        if let Some(el) = element_at_path(doc, candidate) {
            if pred(el) {
                return Some((candidate.to_vec(), el));
            }
        }
    }
    None
}

pub fn closest_of_type(doc: &Document, path: &[usize], ty: ElementType) -> Option<Path> {
    closest_element(doc, path, |el| el.element_type() == ty).map(|(p, _)| p)
}

/// Where an offset at a run boundary resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Backward,
    Forward,
}

impl Editor {
    /// Nearest non-inline element at or above `path`.
    pub fn block_above(&self, path: &[usize]) -> Option<(Path, &Element)> {
        closest_element(self.doc(), path, |el| !self.is_inline(el))
    }

    pub fn void_above(&self, path: &[usize]) -> Option<(Path, &Element)> {
        closest_element(self.doc(), path, |el| self.is_void(el))
    }

    /// Runs of a block that carry editable text (placeholder runs of voids
    /// are skipped).
    pub fn block_texts(&self, block_path: &[usize]) -> Vec<(Path, &Text)> {
        texts_under(self.doc(), block_path)
            .into_iter()
            .filter(|(p, _)| {
                !self
                    .void_above(path::parent(p))
                    .is_some_and(|(void_path, _)| path::is_ancestor(block_path, &void_path))
            })
            .collect()
    }

    /// Byte offset of `point` counted from the start of the block's text.
    pub fn offset_in_block(&self, block_path: &[usize], point: &Point) -> usize {
        let mut offset = 0;
        for (p, t) in texts_under(self.doc(), block_path) {
            match path::compare(&p, &point.path) {
                Ordering::Less => offset += t.text.len(),
                Ordering::Equal if p == point.path => {
                    return offset + point.offset.min(t.text.len());
                }
                _ => break,
            }
        }
        offset
    }

    pub fn point_at_block_offset(
        &self,
        block_path: &[usize],
        offset: usize,
        affinity: Affinity,
    ) -> Option<Point> {
        let texts = self.block_texts(block_path);
        let mut consumed = 0;
        let mut last: Option<Point> = None;
        for (p, t) in &texts {
            let len = t.text.len();
            let end = consumed + len;
            let inside = match affinity {
                Affinity::Backward => offset <= end,
                Affinity::Forward => offset < end,
            };
            if inside && offset >= consumed {
                return Some(Point::new(p.clone(), offset - consumed));
            }
            consumed = end;
            last = Some(Point::new(p.clone(), len));
        }
        last
    }

    /// Text of a block from its start up to `point`.
    pub fn block_text_before(&self, block_path: &[usize], point: &Point) -> String {
        let mut out = String::new();
        for (p, t) in texts_under(self.doc(), block_path) {
            match path::compare(&p, &point.path) {
                Ordering::Less => out.push_str(&t.text),
                Ordering::Equal if p == point.path => {
                    let end = crate::core::clamp_to_char_boundary(&t.text, point.offset);
                    out.push_str(&t.text[..end]);
                    break;
                }
                _ => break,
            }
        }
        out
    }

    /// Lowest blocks touched by the selection, in document order.
    pub fn selected_blocks(&self) -> Vec<Path> {
        let Some(selection) = self.selection() else {
            return Vec::new();
        };
        self.blocks_in(selection)
    }

    pub fn blocks_in(&self, selection: &Selection) -> Vec<Path> {
        let (start, end) = selection.ordered();
        let mut out: Vec<Path> = Vec::new();
        for (p, _) in texts_between(self.doc(), &start, &end) {
            if let Some((block_path, _)) = self.block_above(path::parent(&p)) {
                if !out.contains(&block_path) {
                    out.push(block_path);
                }
            }
        }
        out
    }
}
