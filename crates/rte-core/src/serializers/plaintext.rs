use crate::schema::{Document, ElementKind, Node};

/// Lossy text export: formatting and link targets are dropped, media become
/// bracketed placeholders.
pub fn serialize(doc: &Document) -> String {
    doc.children
        .iter()
        .map(serialize_node)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn serialize_node(node: &Node) -> String {
    let el = match node {
        Node::Text(run) => return run.text.clone(),
        Node::Element(el) => el,
    };
    let children: String = el.children.iter().map(serialize_node).collect();

    match &el.kind {
        ElementKind::Paragraph { .. }
        | ElementKind::Heading { .. }
        | ElementKind::Blockquote { .. }
        | ElementKind::CodeBlock { .. } => children + "\n",
        ElementKind::ListItem { .. } => format!("  {children}\n"),
        ElementKind::Image { url, alt } => {
            format!("[Image: {}]\n", alt.as_deref().unwrap_or(url))
        }
        ElementKind::Video { url, .. } => format!("[Video: {url}]\n"),
        ElementKind::Variable { name } => format!("{{{{{name}}}}}"),
        ElementKind::BulletedList
        | ElementKind::NumberedList
        | ElementKind::Link { .. }
        | ElementKind::Table { .. }
        | ElementKind::TableRow
        | ElementKind::TableCell { .. } => children,
    }
}
