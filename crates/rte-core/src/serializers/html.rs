use std::sync::LazyLock;

use regex::Regex;

use super::html_dom::{DomElement, DomNode, parse_fragment};
use crate::schema::{
    Align, Document, Element, ElementKind, ElementType, Marks, Node, Text, VideoProvider,
};
use crate::video::parse_video_url;

/// Escapes text and attribute values. Single quotes use the `&#x27;` form.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).replace('\'', "&#x27;")
}

/// Renders the document as an HTML fragment, one top-level block per line.
pub fn serialize(doc: &Document) -> String {
    doc.children
        .iter()
        .map(serialize_node)
        .collect::<Vec<_>>()
        .join("\n")
}

fn serialize_text(run: &Text) -> String {
    if run.text.is_empty() && run.marks.is_plain() {
        return String::new();
    }

    let marks = &run.marks;
    let mut out = escape_html(&run.text);
    if marks.code {
        out = format!("<code>{out}</code>");
    }
    if marks.bold {
        out = format!("<strong>{out}</strong>");
    }
    if marks.italic {
        out = format!("<em>{out}</em>");
    }
    if marks.underline {
        out = format!("<u>{out}</u>");
    }
    if marks.strikethrough {
        out = format!("<s>{out}</s>");
    }

    let mut styles = Vec::new();
    if let Some(size) = marks.font_size {
        styles.push(format!("font-size:{size}px"));
    }
    if let Some(color) = &marks.font_color {
        styles.push(format!("color:{color}"));
    }
    if !styles.is_empty() {
        out = format!(
            "<span style=\"{}\">{out}</span>",
            escape_html(&styles.join(";"))
        );
    }
    out
}

fn align_attr(align: Option<Align>) -> String {
    match align {
        Some(align) => format!(" style=\"text-align:{}\"", align.as_str()),
        None => String::new(),
    }
}

fn serialize_node(node: &Node) -> String {
    match node {
        Node::Text(run) => serialize_text(run),
        Node::Element(el) => serialize_element(el),
    }
}

fn serialize_element(el: &Element) -> String {
    let children: String = el.children.iter().map(serialize_node).collect();

    match &el.kind {
        ElementKind::Paragraph { align } => format!("<p{}>{children}</p>", align_attr(*align)),
        ElementKind::Heading { level, align } => {
            format!("<h{level}{}>{children}</h{level}>", align_attr(*align))
        }
        ElementKind::Blockquote { align } => {
            format!("<blockquote{}>{children}</blockquote>", align_attr(*align))
        }
        ElementKind::CodeBlock { language } => {
            let class = language
                .as_deref()
                .map(|lang| format!(" class=\"language-{}\"", escape_html(lang)))
                .unwrap_or_default();
            format!("<pre><code{class}>{children}</code></pre>")
        }
        ElementKind::BulletedList => format!("<ul>{children}</ul>"),
        ElementKind::NumberedList => format!("<ol>{children}</ol>"),
        ElementKind::ListItem { align } => format!("<li{}>{children}</li>", align_attr(*align)),
        ElementKind::Link { url } => format!("<a href=\"{}\">{children}</a>", escape_html(url)),
        ElementKind::Image { url, alt } => format!(
            "<img src=\"{}\" alt=\"{}\" />",
            escape_html(url),
            escape_html(alt.as_deref().unwrap_or_default())
        ),
        ElementKind::Variable { name } => {
            let name = escape_html(name);
            format!("<span data-variable=\"{name}\">{{{{{name}}}}}</span>")
        }
        ElementKind::Video {
            url,
            embed_url,
            provider,
            caption,
        } => {
            let embed = escape_html(embed_url);
            let player = if *provider == VideoProvider::Direct {
                format!("<video src=\"{embed}\" controls></video>")
            } else {
                format!("<iframe src=\"{embed}\" frameborder=\"0\" allowfullscreen></iframe>")
            };
            let caption = caption
                .as_deref()
                .map(|c| format!("<p>{}</p>", escape_html(c)))
                .unwrap_or_default();
            format!(
                "<div data-video-provider=\"{provider}\" data-video-url=\"{}\">{player}{caption}</div>",
                escape_html(url)
            )
        }
        ElementKind::Table { col_widths } => {
            let widths = col_widths
                .as_ref()
                .filter(|w| !w.is_empty())
                .and_then(|w| serde_json::to_string(w).ok())
                .map(|json| format!(" data-col-widths=\"{}\"", escape_html(&json)))
                .unwrap_or_default();
            format!("<table class=\"rte-table\"{widths}><tbody>{children}</tbody></table>")
        }
        ElementKind::TableRow => format!("<tr>{children}</tr>"),
        ElementKind::TableCell { header } => {
            let tag = if *header { "th" } else { "td" };
            format!("<{tag} class=\"rte-table-cell\">{children}</{tag}>")
        }
    }
}

static FONT_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"font-size:\s*(\d+(?:\.\d+)?)px").expect("font-size regex must compile")
});

static TEXT_ALIGN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|;)\s*text-align:\s*(\w+)").expect("text-align regex must compile")
});

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|;)\s*color:\s*([^;]+)").expect("color regex must compile")
});

/// Tags whose whitespace-only text children are markup formatting, not content.
const CONTAINER_TAGS: [&str; 10] = [
    "", "html", "body", "ul", "ol", "table", "thead", "tbody", "tfoot", "tr",
];

const BLOCK_TAGS: [&str; 20] = [
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "ul", "ol", "li", "table",
    "thead", "tbody", "tfoot", "tr", "td", "th", "div",
];

fn style_align(el: &DomElement) -> Option<Align> {
    let style = el.attr("style")?;
    TEXT_ALIGN_RE
        .captures(style)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Align::parse(m.as_str()))
}

fn style_font_size(style: &str) -> Option<u32> {
    let raw = FONT_SIZE_RE.captures(style)?.get(1)?.as_str();
    let size = raw.parse::<f64>().ok()?.round();
    (size >= 1.0).then_some(size as u32)
}

fn style_color(style: &str) -> Option<String> {
    let color = COLOR_RE.captures(style)?.get(1)?.as_str().trim();
    (!color.is_empty()).then(|| color.to_string())
}

fn is_inline_node(node: &Node) -> bool {
    match node {
        Node::Text(_) => true,
        Node::Element(el) => el.element_type().is_inline(),
    }
}

/// Applies `update` to every run under `nodes`, leaving void contents alone.
fn update_runs(nodes: &mut [Node], update: &dyn Fn(&mut Marks)) {
    for node in nodes {
        match node {
            Node::Text(run) => update(&mut run.marks),
            Node::Element(el) if !el.element_type().is_void() => update_runs(&mut el.children, update),
            Node::Element(_) => {}
        }
    }
}

/// Groups consecutive inline nodes into paragraphs so `nodes` only holds
/// blocks.
fn blockify(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::new();
    let mut inline_run: Vec<Node> = Vec::new();
    for node in nodes {
        if is_inline_node(&node) {
            inline_run.push(node);
            continue;
        }
        if !inline_run.is_empty() {
            out.push(Node::element(
                ElementKind::paragraph(),
                std::mem::take(&mut inline_run),
            ));
        }
        out.push(node);
    }
    if !inline_run.is_empty() {
        out.push(Node::element(ElementKind::paragraph(), inline_run));
    }
    out
}

fn element(kind: ElementKind, mut children: Vec<Node>) -> Vec<Node> {
    if children.is_empty() {
        children.push(Node::text(""));
    }
    vec![Node::element(kind, children)]
}

fn keep_type(nodes: Vec<Node>, ty: ElementType) -> Vec<Node> {
    nodes
        .into_iter()
        .filter(|node| node.element_type() == Some(ty))
        .collect()
}

fn convert_children(parent: &str, children: &[DomNode]) -> Vec<Node> {
    let structural = CONTAINER_TAGS.contains(&parent)
        || children.iter().any(|child| {
            matches!(child, DomNode::Element(el) if BLOCK_TAGS.contains(&el.name.as_str()))
        });

    let mut out = Vec::new();
    for child in children {
        match child {
            DomNode::Text(text) => {
                if structural && text.trim().is_empty() {
                    continue;
                }
                out.push(Node::text(text.clone()));
            }
            DomNode::Element(el) => out.extend(convert_element(el)),
        }
    }
    out
}

fn convert_video(el: &DomElement, url: &str) -> Node {
    let parsed = parse_video_url(url);
    let provider = el
        .attr("data-video-provider")
        .and_then(VideoProvider::parse)
        .or_else(|| parsed.as_ref().map(|p| p.provider))
        .unwrap_or(VideoProvider::Direct);
    let embed_url = el
        .find("iframe")
        .or_else(|| el.find("video"))
        .and_then(|player| player.attr("src"))
        .map(str::to_string)
        .or_else(|| parsed.map(|p| p.embed_url))
        .unwrap_or_else(|| url.to_string());
    let caption = el
        .find("p")
        .map(DomElement::text_content)
        .filter(|c| !c.trim().is_empty());

    Node::void(ElementKind::Video {
        url: url.to_string(),
        embed_url,
        provider,
        caption,
    })
}

fn convert_table(el: &DomElement) -> Vec<Node> {
    let rows = keep_type(
        convert_children(&el.name, &el.children),
        ElementType::TableRow,
    );
    let cols = rows.iter().map(|row| row.children().len()).max().unwrap_or(0);

    let col_widths = el.attr("data-col-widths").and_then(|raw| {
        match serde_json::from_str::<Vec<u32>>(raw) {
            Ok(widths) if widths.len() == cols => Some(widths),
            Ok(widths) => {
                tracing::debug!(
                    widths = widths.len(),
                    cols,
                    "discarding column widths for a different column count"
                );
                None
            }
            Err(err) => {
                tracing::debug!(%err, "discarding malformed column widths");
                None
            }
        }
    });

    element(ElementKind::Table { col_widths }, rows)
}

fn convert_element(el: &DomElement) -> Vec<Node> {
    let name = el.name.as_str();

    match name {
        "br" => return vec![Node::text("\n")],
        "pre" => {
            let language = el
                .find("code")
                .and_then(|code| code.attr("class"))
                .and_then(|class| {
                    class
                        .split_whitespace()
                        .find_map(|c| c.strip_prefix("language-"))
                })
                .filter(|lang| !lang.is_empty())
                .map(str::to_string);
            return vec![Node::element(
                ElementKind::CodeBlock { language },
                vec![Node::text(el.text_content())],
            )];
        }
        "img" => {
            let url = el.attr("src").unwrap_or_default().to_string();
            let alt = el
                .attr("alt")
                .filter(|alt| !alt.is_empty())
                .map(str::to_string);
            return vec![Node::void(ElementKind::Image { url, alt })];
        }
        "span" => {
            if let Some(var) = el.attr("data-variable") {
                return vec![Node::void(ElementKind::Variable {
                    name: var.to_string(),
                })];
            }
        }
        "div" => {
            if let (Some(_), Some(url)) = (el.attr("data-video-provider"), el.attr("data-video-url")) {
                return vec![convert_video(el, url)];
            }
        }
        "table" => return convert_table(el),
        _ => {}
    }

    let mut children = convert_children(name, &el.children);

    match name {
        "p" => element(ElementKind::Paragraph { align: style_align(el) }, children),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<u8>().unwrap_or(1);
            element(
                ElementKind::Heading {
                    level,
                    align: style_align(el),
                },
                children,
            )
        }
        "blockquote" => element(ElementKind::Blockquote { align: style_align(el) }, children),
        "ul" => element(ElementKind::BulletedList, children),
        "ol" => element(ElementKind::NumberedList, children),
        "li" => element(ElementKind::ListItem { align: style_align(el) }, children),
        "a" => {
            let url = el.attr("href").unwrap_or_default().to_string();
            element(ElementKind::Link { url }, children)
        }
        "tr" => element(
            ElementKind::TableRow,
            keep_type(children, ElementType::TableCell),
        ),
        "td" | "th" => {
            let mut blocks = blockify(children);
            if blocks.is_empty() {
                blocks.push(Node::paragraph(""));
            }
            element(
                ElementKind::TableCell {
                    header: name == "th",
                },
                blocks,
            )
        }
        "strong" | "b" => {
            update_runs(&mut children, &|marks| marks.bold = true);
            children
        }
        "em" | "i" => {
            update_runs(&mut children, &|marks| marks.italic = true);
            children
        }
        "u" => {
            update_runs(&mut children, &|marks| marks.underline = true);
            children
        }
        "s" | "del" | "strike" => {
            update_runs(&mut children, &|marks| marks.strikethrough = true);
            children
        }
        "code" => {
            update_runs(&mut children, &|marks| marks.code = true);
            children
        }
        "span" => {
            let style = el.attr("style").unwrap_or_default();
            let font_size = style_font_size(style);
            let font_color = style_color(style);
            if font_size.is_some() || font_color.is_some() {
                update_runs(&mut children, &|marks| {
                    if marks.font_size.is_none() {
                        marks.font_size = font_size;
                    }
                    if marks.font_color.is_none() {
                        marks.font_color.clone_from(&font_color);
                    }
                });
            }
            children
        }
        _ => children,
    }
}

/// Parses an HTML fragment into a document. Blank input, or markup with no
/// convertible content, yields the default single empty paragraph.
pub fn deserialize(html: &str) -> Document {
    if html.trim().is_empty() {
        return Document::default();
    }
    let nodes = parse_fragment(html);
    let children = blockify(convert_children("", &nodes));
    if children.is_empty() {
        return Document::default();
    }
    Document::new(children)
}
