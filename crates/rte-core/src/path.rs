//! Path arithmetic.
//!
//! A path is the sequence of child indices leading from the document root to
//! a node. It is a coordinate into one snapshot of the tree: any structural
//! edit may invalidate it, so callers recompute paths after every mutation
//! (or carry them through [`crate::transform_path`]) instead of caching them.

use std::cmp::Ordering;

pub type Path = Vec<usize>;

pub fn parent(path: &[usize]) -> &[usize] {
    match path.split_last() {
        Some((_, parent)) => parent,
        None => &[],
    }
}

pub fn last_index(path: &[usize]) -> Option<usize> {
    path.last().copied()
}

pub fn child(path: &[usize], ix: usize) -> Path {
    let mut out = path.to_vec();
    out.push(ix);
    out
}

pub fn next(path: &[usize]) -> Path {
    let mut out = path.to_vec();
    if let Some(last) = out.last_mut() {
        *last += 1;
    }
    out
}

pub fn previous(path: &[usize]) -> Option<Path> {
    let (&last, parent) = path.split_last()?;
    let prev = last.checked_sub(1)?;
    let mut out = parent.to_vec();
    out.push(prev);
    Some(out)
}

pub fn has_previous(path: &[usize]) -> bool {
    path.last().is_some_and(|&ix| ix > 0)
}

/// True when `ancestor` is a strict prefix of `path`.
pub fn is_ancestor(ancestor: &[usize], path: &[usize]) -> bool {
    ancestor.len() < path.len() && path.starts_with(ancestor)
}

/// True when `path` starts with `ancestor` (the node itself included).
pub fn is_at_or_below(ancestor: &[usize], path: &[usize]) -> bool {
    path.starts_with(ancestor)
}

/// True when `a` ends before `b` at `a`'s own depth: same parent prefix, and
/// `a`'s last index is smaller than `b`'s index at that depth.
pub fn ends_before(a: &[usize], b: &[usize]) -> bool {
    let Some((&last, parent)) = a.split_last() else {
        return false;
    };
    b.len() > parent.len() && b.starts_with(parent) && last < b[parent.len()]
}

pub fn is_sibling(a: &[usize], b: &[usize]) -> bool {
    a.len() == b.len() && !a.is_empty() && parent(a) == parent(b) && a != b
}

/// Document order. An ancestor compares equal to its descendants.
pub fn compare(a: &[usize], b: &[usize]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

pub fn common(a: &[usize], b: &[usize]) -> Path {
    a.iter()
        .zip(b.iter())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| *x)
        .collect()
}
