//! Structural invariants restored after every edit.
//!
//! Each pass walks a snapshot and returns ops valid when applied in order:
//! elements are visited last-to-first and children before parents, so an op
//! never shifts a path that a later op in the same batch still refers to.

use crate::marks::{MAX_FONT_SIZE, MIN_FONT_SIZE};
use crate::ops::Op;
use crate::path::{self, Path};
use crate::plugin::{EditorPlugin, NormalizePass, PluginRegistry};
use crate::schema::{Document, Element, ElementKind, ElementType, Marks, Node};

pub struct CorePlugin;

impl EditorPlugin for CorePlugin {
    fn id(&self) -> &'static str {
        "core"
    }

    fn normalize_passes(&self) -> Vec<Box<dyn NormalizePass>> {
        vec![
            Box::new(EnsureNonEmptyDocument),
            Box::new(WrapRootInlines),
            Box::new(EnsureVoidPlaceholder),
            Box::new(RepairChildlessElements),
            Box::new(NormalizeInlineChildren),
            Box::new(NormalizeTableStructure),
            Box::new(NormalizeHeadingLevels),
            Box::new(ClampFontSizes),
        ]
    }
}

/// Visits every element, last-to-first and children before parents.
fn walk_elements_rev(
    children: &[Node],
    prefix: &mut Path,
    visit: &mut dyn FnMut(&Element, &[usize]),
) {
    for (ix, node) in children.iter().enumerate().rev() {
        if let Node::Element(el) = node {
            prefix.push(ix);
            walk_elements_rev(&el.children, prefix, visit);
            visit(el, prefix);
            prefix.pop();
        }
    }
}

fn is_inline_node(node: &Node, registry: &PluginRegistry) -> bool {
    match node {
        Node::Text(_) => true,
        Node::Element(el) => registry.is_inline(&el.kind),
    }
}

struct EnsureNonEmptyDocument;

impl NormalizePass for EnsureNonEmptyDocument {
    fn id(&self) -> &'static str {
        "core.ensure_non_empty_document"
    }

    fn run(&self, doc: &Document, _registry: &PluginRegistry) -> Vec<Op> {
        if doc.children.is_empty() {
            return vec![Op::InsertNode {
                path: vec![0],
                node: Node::paragraph(""),
            }];
        }
        Vec::new()
    }
}

struct WrapRootInlines;

impl NormalizePass for WrapRootInlines {
    fn id(&self) -> &'static str {
        "core.wrap_root_inlines"
    }

    fn run(&self, doc: &Document, registry: &PluginRegistry) -> Vec<Op> {
        let mut runs: Vec<(usize, usize)> = Vec::new();
        let mut ix = 0;
        while ix < doc.children.len() {
            if is_inline_node(&doc.children[ix], registry) {
                let start = ix;
                while ix + 1 < doc.children.len() && is_inline_node(&doc.children[ix + 1], registry)
                {
                    ix += 1;
                }
                runs.push((start, ix));
            }
            ix += 1;
        }

        let mut ops = Vec::new();
        for (start, end) in runs.into_iter().rev() {
            ops.push(Op::InsertNode {
                path: vec![start],
                node: Node::Element(Element::new(ElementKind::paragraph(), Vec::new())),
            });
            for k in 0..=(end - start) {
                ops.push(Op::MoveNode {
                    path: vec![start + 1],
                    to: vec![start, k],
                });
            }
        }
        ops
    }
}

struct EnsureVoidPlaceholder;

impl NormalizePass for EnsureVoidPlaceholder {
    fn id(&self) -> &'static str {
        "core.ensure_void_placeholder"
    }

    fn run(&self, doc: &Document, registry: &PluginRegistry) -> Vec<Op> {
        let mut ops = Vec::new();
        walk_elements_rev(&doc.children, &mut Vec::new(), &mut |el, el_path| {
            if !registry.is_void(&el.kind) {
                return;
            }
            if let [Node::Text(t)] = el.children.as_slice() {
                if !t.text.is_empty() {
                    ops.push(Op::RemoveText {
                        path: path::child(el_path, 0),
                        range: 0..t.text.len(),
                    });
                }
                return;
            }
            for ix in (0..el.children.len()).rev() {
                ops.push(Op::RemoveNode {
                    path: path::child(el_path, ix),
                });
            }
            ops.push(Op::InsertNode {
                path: path::child(el_path, 0),
                node: Node::text(""),
            });
        });
        ops
    }
}

struct RepairChildlessElements;

impl NormalizePass for RepairChildlessElements {
    fn id(&self) -> &'static str {
        "core.repair_childless_elements"
    }

    fn run(&self, doc: &Document, registry: &PluginRegistry) -> Vec<Op> {
        let mut ops = Vec::new();
        walk_elements_rev(&doc.children, &mut Vec::new(), &mut |el, el_path| {
            if !el.children.is_empty() || registry.is_void(&el.kind) {
                return;
            }
            match el.element_type() {
                ElementType::BulletedList
                | ElementType::NumberedList
                | ElementType::Table
                | ElementType::TableRow => ops.push(Op::RemoveNode {
                    path: el_path.to_vec(),
                }),
                ElementType::TableCell => ops.push(Op::InsertNode {
                    path: path::child(el_path, 0),
                    node: Node::paragraph(""),
                }),
                _ => ops.push(Op::InsertNode {
                    path: path::child(el_path, 0),
                    node: Node::text(""),
                }),
            }
        });
        ops
    }
}

/// Inline content: runs with equal marks merge, redundant empty runs go,
/// and every inline element is flanked by runs so a caret can sit on
/// either side of it.
struct NormalizeInlineChildren;

impl NormalizePass for NormalizeInlineChildren {
    fn id(&self) -> &'static str {
        "core.normalize_inline_children"
    }

    fn run(&self, doc: &Document, registry: &PluginRegistry) -> Vec<Op> {
        let mut ops = Vec::new();
        walk_elements_rev(&doc.children, &mut Vec::new(), &mut |el, el_path| {
            if registry.is_void(&el.kind)
                || el.children.is_empty()
                || !el.children.iter().all(|n| is_inline_node(n, registry))
            {
                return;
            }

            let mut kids: Vec<Node> = el.children.clone();
            let mut ix = 0;
            while ix < kids.len() {
                if let Node::Element(_) = &kids[ix] {
                    if ix == 0 || !matches!(kids[ix - 1], Node::Text(_)) {
                        ops.push(Op::InsertNode {
                            path: path::child(el_path, ix),
                            node: Node::text(""),
                        });
                        kids.insert(ix, Node::text(""));
                        ix += 1;
                    }
                    if ix + 1 == kids.len() {
                        ops.push(Op::InsertNode {
                            path: path::child(el_path, ix + 1),
                            node: Node::text(""),
                        });
                        kids.push(Node::text(""));
                    }
                    ix += 1;
                    continue;
                }

                let (Some(Node::Text(prev)), Node::Text(cur)) =
                    (ix.checked_sub(1).and_then(|p| kids.get(p)), &kids[ix])
                else {
                    ix += 1;
                    continue;
                };

                if prev.marks == cur.marks {
                    let position = prev.text.len();
                    let appended = cur.text.clone();
                    ops.push(Op::MergeNode {
                        path: path::child(el_path, ix),
                        position,
                    });
                    if let Node::Text(prev) = &mut kids[ix - 1] {
                        prev.text.push_str(&appended);
                    }
                    kids.remove(ix);
                } else if prev.text.is_empty() {
                    ops.push(Op::RemoveNode {
                        path: path::child(el_path, ix - 1),
                    });
                    kids.remove(ix - 1);
                    ix -= 1;
                } else if cur.text.is_empty() {
                    ops.push(Op::RemoveNode {
                        path: path::child(el_path, ix),
                    });
                    kids.remove(ix);
                } else {
                    ix += 1;
                }
            }
        });
        ops
    }
}

fn empty_cell() -> Node {
    Node::element(
        ElementKind::TableCell { header: false },
        vec![Node::paragraph("")],
    )
}

/// Rows are padded to the widest row; column widths that no longer match
/// the column count are dropped.
struct NormalizeTableStructure;

impl NormalizePass for NormalizeTableStructure {
    fn id(&self) -> &'static str {
        "table.normalize_structure"
    }

    fn run(&self, doc: &Document, _registry: &PluginRegistry) -> Vec<Op> {
        let mut ops = Vec::new();
        walk_elements_rev(&doc.children, &mut Vec::new(), &mut |el, el_path| {
            let ElementKind::Table { col_widths } = &el.kind else {
                return;
            };
            let widths: Vec<usize> = el
                .children
                .iter()
                .map(|row| row.children().len())
                .collect();
            let cols = widths.iter().copied().max().unwrap_or(0);

            for (row_ix, &len) in widths.iter().enumerate().rev() {
                if len == 0 || len >= cols {
                    continue;
                }
                let row_path = path::child(el_path, row_ix);
                for col in len..cols {
                    ops.push(Op::InsertNode {
                        path: path::child(&row_path, col),
                        node: empty_cell(),
                    });
                }
            }

            if let Some(stored) = col_widths {
                if stored.len() != cols || stored.contains(&0) {
                    tracing::debug!(
                        stored = stored.len(),
                        cols,
                        "dropping column widths that do not match the table"
                    );
                    ops.push(Op::SetElement {
                        path: el_path.to_vec(),
                        kind: ElementKind::Table { col_widths: None },
                    });
                }
            }
        });
        ops
    }
}

struct NormalizeHeadingLevels;

impl NormalizePass for NormalizeHeadingLevels {
    fn id(&self) -> &'static str {
        "heading.normalize_levels"
    }

    fn run(&self, doc: &Document, _registry: &PluginRegistry) -> Vec<Op> {
        let mut ops = Vec::new();
        walk_elements_rev(&doc.children, &mut Vec::new(), &mut |el, el_path| {
            if let ElementKind::Heading { level, align } = &el.kind {
                if !(1..=6).contains(level) {
                    ops.push(Op::SetElement {
                        path: el_path.to_vec(),
                        kind: ElementKind::Heading {
                            level: (*level).clamp(1, 6),
                            align: *align,
                        },
                    });
                }
            }
        });
        ops
    }
}

struct ClampFontSizes;

impl NormalizePass for ClampFontSizes {
    fn id(&self) -> &'static str {
        "marks.clamp_font_sizes"
    }

    fn run(&self, doc: &Document, _registry: &PluginRegistry) -> Vec<Op> {
        let mut ops = Vec::new();
        for (text_path, text) in crate::query::texts(doc) {
            let Some(size) = text.marks.font_size else {
                continue;
            };
            let clamped = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
            if clamped != size {
                ops.push(Op::SetMarks {
                    path: text_path,
                    marks: Marks {
                        font_size: Some(clamped),
                        ..text.marks.clone()
                    },
                });
            }
        }
        ops
    }
}
