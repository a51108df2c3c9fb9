//! Markdown conversion.
//!
//! The reader is a line scanner over a practical subset: fenced code, ATX
//! headings, one-paragraph blockquotes, bulleted and numbered lists (nested
//! by two-space indentation), standalone images and videos, and paragraphs.
//! Inline markup is recognized in a single non-nesting sweep. Underline has no
//! Markdown form and is dropped on output.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::schema::{Document, Element, ElementKind, Marks, Node, Text, VideoProvider};
use crate::video::parse_video_url;

pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();
    for node in &doc.children {
        serialize_block(node, &mut out);
    }
    out.trim().to_string()
}

fn serialize_text(run: &Text) -> String {
    if run.text.is_empty() {
        return String::new();
    }
    let marks = &run.marks;
    let mut text = run.text.clone();
    if marks.code {
        text = format!("`{text}`");
    }
    if marks.bold {
        text = format!("**{text}**");
    }
    if marks.italic {
        text = format!("*{text}*");
    }
    if marks.strikethrough {
        text = format!("~~{text}~~");
    }
    text
}

fn serialize_inline(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(run) => out.push_str(&serialize_text(run)),
            Node::Element(el) => match &el.kind {
                ElementKind::Link { url } => {
                    out.push_str(&format!("[{}]({url})", serialize_inline(&el.children)));
                }
                ElementKind::Variable { name } => out.push_str(&format!("{{{{{name}}}}}")),
                // Blocks nested inside inline content flatten to their text.
                _ => out.push_str(&serialize_inline(&el.children)),
            },
        }
    }
    out
}

fn serialize_list(el: &Element, depth: usize, out: &mut String) {
    let ordered = el.kind == ElementKind::NumberedList;
    let indent = "  ".repeat(depth);
    let mut number = 0;
    for child in &el.children {
        let Node::Element(item) = child else {
            continue;
        };
        match &item.kind {
            ElementKind::BulletedList | ElementKind::NumberedList => {
                serialize_list(item, depth + 1, out);
            }
            _ => {
                number += 1;
                let marker = if ordered {
                    format!("{number}.")
                } else {
                    "-".to_string()
                };
                let content = serialize_inline(&item.children);
                out.push_str(&format!("{indent}{marker} {}\n", content.trim()));
            }
        }
    }
}

fn serialize_block(node: &Node, out: &mut String) {
    let el = match node {
        Node::Text(run) => {
            out.push_str(&serialize_text(run));
            out.push_str("\n\n");
            return;
        }
        Node::Element(el) => el,
    };

    match &el.kind {
        ElementKind::Paragraph { .. } | ElementKind::ListItem { .. } => {
            out.push_str(&serialize_inline(&el.children));
            out.push_str("\n\n");
        }
        ElementKind::Heading { level, .. } => {
            let hashes = "#".repeat(usize::from(*level));
            out.push_str(&format!("{hashes} {}\n\n", serialize_inline(&el.children)));
        }
        ElementKind::Blockquote { .. } => {
            let body = serialize_inline(&el.children);
            let quoted: Vec<String> = body.split('\n').map(|line| format!("> {line}")).collect();
            out.push_str(&quoted.join("\n"));
            out.push_str("\n\n");
        }
        ElementKind::CodeBlock { language } => {
            out.push_str(&format!(
                "```{}\n{}\n```\n\n",
                language.as_deref().unwrap_or_default(),
                el.text_content()
            ));
        }
        ElementKind::BulletedList | ElementKind::NumberedList => {
            serialize_list(el, 0, out);
            out.push('\n');
        }
        ElementKind::Link { .. } | ElementKind::Variable { .. } => {
            out.push_str(&serialize_inline(std::slice::from_ref(node)));
            out.push_str("\n\n");
        }
        ElementKind::Image { url, alt } => {
            out.push_str(&format!("![{}]({url})\n\n", alt.as_deref().unwrap_or_default()));
        }
        ElementKind::Video {
            url,
            embed_url,
            caption,
            ..
        } => {
            let caption = caption
                .as_deref()
                .map(|c| format!(" \"{c}\""))
                .unwrap_or_default();
            out.push_str(&format!("[![Video]({embed_url})]({url}{caption})\n\n"));
        }
        ElementKind::Table { .. } | ElementKind::TableRow | ElementKind::TableCell { .. } => {
            for child in &el.children {
                serialize_block(child, out);
            }
        }
    }
}

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("heading regex must compile"));

static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^( *)([-*]|\d+\.)\s+(.*)$").expect("list item regex must compile")
});

static IMAGE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^!\[([^\]]*)\]\(([^)]+)\)$").expect("image line regex must compile")
});

static VIDEO_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[!\[Video\]\(([^)]+)\)\]\((\S+?)(?: "([^"]*)")?\)$"#)
        .expect("video line regex must compile")
});

static INLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\*\*(.+?)\*\*|\*(.+?)\*|~~(.+?)~~|`(.+?)`|\[(.+?)\]\((.+?)\)|\{\{([a-zA-Z_][\w.]*)\}\}",
    )
    .expect("inline markdown regex must compile")
});

struct ListLine<'a> {
    depth: usize,
    ordered: bool,
    text: &'a str,
}

fn list_line(line: &str) -> Option<ListLine<'_>> {
    let caps = LIST_ITEM_RE.captures(line)?;
    let indent = caps.get(1).map_or(0, |m| m.as_str().len());
    let marker = caps.get(2)?.as_str();
    Some(ListLine {
        depth: indent / 2,
        ordered: marker.ends_with('.'),
        text: caps.get(3).map_or("", |m| m.as_str()),
    })
}

fn styled(text: &str, mark: fn(&mut Marks)) -> Node {
    let mut marks = Marks::default();
    mark(&mut marks);
    Node::styled(text, marks)
}

fn inline_match(caps: &Captures<'_>) -> Option<Node> {
    let group = |ix: usize| caps.get(ix).map(|m| m.as_str());
    if let Some(text) = group(1) {
        return Some(styled(text, |m| m.bold = true));
    }
    if let Some(text) = group(2) {
        return Some(styled(text, |m| m.italic = true));
    }
    if let Some(text) = group(3) {
        return Some(styled(text, |m| m.strikethrough = true));
    }
    if let Some(text) = group(4) {
        return Some(styled(text, |m| m.code = true));
    }
    if let (Some(text), Some(url)) = (group(5), group(6)) {
        return Some(Node::element(
            ElementKind::Link {
                url: url.to_string(),
            },
            vec![Node::text(text)],
        ));
    }
    group(7).map(|name| {
        Node::void(ElementKind::Variable {
            name: name.to_string(),
        })
    })
}

/// Inline markup in one line of text. Matches never nest.
pub fn parse_inline(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut last = 0;
    for caps in INLINE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            nodes.push(Node::text(&text[last..whole.start()]));
        }
        if let Some(node) = inline_match(&caps) {
            nodes.push(node);
        }
        last = whole.end();
    }
    if last < text.len() {
        nodes.push(Node::text(&text[last..]));
    }
    if nodes.is_empty() {
        nodes.push(Node::text(""));
    }
    nodes
}

fn list_container(ordered: bool) -> ElementKind {
    if ordered {
        ElementKind::NumberedList
    } else {
        ElementKind::BulletedList
    }
}

/// Builds one list from `items[*ix..]` at `depth`. Deeper items become nested
/// lists among the items; a shallower item, or a different marker kind at a
/// nested depth, ends the list.
fn build_list(items: &[ListLine<'_>], ix: &mut usize, depth: usize, ordered: bool) -> Node {
    let mut children = Vec::new();
    while let Some(item) = items.get(*ix) {
        if item.depth < depth {
            break;
        }
        if item.depth > depth {
            children.push(build_list(items, ix, depth + 1, item.ordered));
            continue;
        }
        if item.ordered != ordered && !children.is_empty() {
            break;
        }
        children.push(Node::element(
            ElementKind::ListItem { align: None },
            parse_inline(item.text),
        ));
        *ix += 1;
    }
    Node::element(list_container(ordered), children)
}

pub fn deserialize(markdown: &str) -> Document {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        if let Some(info) = line.strip_prefix("```") {
            let language = Some(info.trim())
                .filter(|lang| !lang.is_empty())
                .map(str::to_string);
            let mut code = Vec::new();
            i += 1;
            while i < lines.len() && !lines[i].starts_with("```") {
                code.push(lines[i]);
                i += 1;
            }
            i += 1;
            blocks.push(Node::element(
                ElementKind::CodeBlock { language },
                vec![Node::text(code.join("\n"))],
            ));
            continue;
        }

        if let Some(caps) = HEADING_RE.captures(line) {
            let level = caps.get(1).map_or(1, |m| m.as_str().len()) as u8;
            let text = caps.get(2).map_or("", |m| m.as_str());
            blocks.push(Node::element(ElementKind::heading(level), parse_inline(text)));
            i += 1;
            continue;
        }

        if line.starts_with("> ") {
            let mut quoted = Vec::new();
            while i < lines.len() {
                let Some(rest) = lines[i].strip_prefix("> ") else {
                    break;
                };
                quoted.push(rest);
                i += 1;
            }
            blocks.push(Node::element(
                ElementKind::Blockquote { align: None },
                parse_inline(&quoted.join(" ")),
            ));
            continue;
        }

        if let Some(first) = list_line(line).filter(|item| item.depth == 0) {
            let mut items = vec![first];
            i += 1;
            while i < lines.len() {
                let Some(item) = list_line(lines[i]) else {
                    break;
                };
                if item.depth == 0 && item.ordered != items[0].ordered {
                    break;
                }
                items.push(item);
                i += 1;
            }
            let ordered = items[0].ordered;
            let mut ix = 0;
            blocks.push(build_list(&items, &mut ix, 0, ordered));
            continue;
        }

        if let Some(caps) = IMAGE_LINE_RE.captures(line) {
            let alt = caps
                .get(1)
                .map(|m| m.as_str())
                .filter(|alt| !alt.is_empty())
                .map(str::to_string);
            let url = caps.get(2).map_or("", |m| m.as_str()).to_string();
            blocks.push(Node::void(ElementKind::Image { url, alt }));
            i += 1;
            continue;
        }

        if let Some(caps) = VIDEO_LINE_RE.captures(line) {
            let embed_url = caps.get(1).map_or("", |m| m.as_str()).to_string();
            let url = caps.get(2).map_or("", |m| m.as_str()).to_string();
            let provider = parse_video_url(&url)
                .map(|parsed| parsed.provider)
                .unwrap_or(VideoProvider::Direct);
            let caption = caps
                .get(3)
                .map(|m| m.as_str())
                .filter(|c| !c.is_empty())
                .map(str::to_string);
            blocks.push(Node::void(ElementKind::Video {
                url,
                embed_url,
                provider,
                caption,
            }));
            i += 1;
            continue;
        }

        blocks.push(Node::element(ElementKind::paragraph(), parse_inline(line)));
        i += 1;
    }

    if blocks.is_empty() {
        return Document::default();
    }
    Document::new(blocks)
}
