use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Concatenated text of every run in the document, without separators.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            node.collect_text(&mut out);
        }
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self {
            children: vec![Node::paragraph("")],
        }
    }
}

/// A document node: either a formatted text run or a typed element.
///
/// JSON shape follows the Slate convention: elements carry a `type` tag,
/// runs carry `text` plus flattened formatting flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text::new(text))
    }

    pub fn styled(text: impl Into<String>, marks: Marks) -> Self {
        Node::Text(Text {
            text: text.into(),
            marks,
        })
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::Element(Element::new(
            ElementKind::Paragraph { align: None },
            vec![Node::text(text)],
        ))
    }

    pub fn element(kind: ElementKind, children: Vec<Node>) -> Self {
        Node::Element(Element::new(kind, children))
    }

    /// An element whose only child is the empty placeholder run.
    pub fn void(kind: ElementKind) -> Self {
        Node::Element(Element::new(kind, vec![Node::text("")]))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    pub fn kind(&self) -> Option<&ElementKind> {
        self.as_element().map(|el| &el.kind)
    }

    pub fn element_type(&self) -> Option<ElementType> {
        self.kind().map(ElementKind::element_type)
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(el) => &el.children,
            Node::Text(_) => &[],
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(&t.text),
            Node::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(flatten)]
    pub kind: ElementKind,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(kind: ElementKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Text {
    pub text: String,
    #[serde(flatten)]
    pub marks: Marks,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Formatting carried by a text run. Absent flags are false; absent scalars
/// inherit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
}

impl Marks {
    pub fn get(&self, mark: MarkType) -> bool {
        match mark {
            MarkType::Bold => self.bold,
            MarkType::Italic => self.italic,
            MarkType::Underline => self.underline,
            MarkType::Strikethrough => self.strikethrough,
            MarkType::Code => self.code,
        }
    }

    pub fn set(&mut self, mark: MarkType, value: bool) {
        let slot = match mark {
            MarkType::Bold => &mut self.bold,
            MarkType::Italic => &mut self.italic,
            MarkType::Underline => &mut self.underline,
            MarkType::Strikethrough => &mut self.strikethrough,
            MarkType::Code => &mut self.code,
        };
        *slot = value;
    }

    pub fn with(mut self, mark: MarkType) -> Self {
        self.set(mark, true);
        self
    }

    pub fn is_plain(&self) -> bool {
        *self == Marks::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkType {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
}

impl MarkType {
    pub const ALL: [MarkType; 5] = [
        MarkType::Bold,
        MarkType::Italic,
        MarkType::Underline,
        MarkType::Strikethrough,
        MarkType::Code,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
    Justify,
}

impl Align {
    pub fn as_str(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
            Align::Justify => "justify",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Align::Left),
            "center" => Some(Align::Center),
            "right" => Some(Align::Right),
            "justify" => Some(Align::Justify),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoProvider {
    Youtube,
    Vimeo,
    Dailymotion,
    Loom,
    Wistia,
    Direct,
}

impl VideoProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            VideoProvider::Youtube => "youtube",
            VideoProvider::Vimeo => "vimeo",
            VideoProvider::Dailymotion => "dailymotion",
            VideoProvider::Loom => "loom",
            VideoProvider::Wistia => "wistia",
            VideoProvider::Direct => "direct",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "youtube" => Some(VideoProvider::Youtube),
            "vimeo" => Some(VideoProvider::Vimeo),
            "dailymotion" => Some(VideoProvider::Dailymotion),
            "loom" => Some(VideoProvider::Loom),
            "wistia" => Some(VideoProvider::Wistia),
            "direct" => Some(VideoProvider::Direct),
            _ => None,
        }
    }
}

impl fmt::Display for VideoProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of element variants with their type-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ElementKind {
    Paragraph {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
    },
    Heading {
        level: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
    },
    Blockquote {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
    },
    CodeBlock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    BulletedList,
    NumberedList,
    ListItem {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
    },
    Link {
        url: String,
    },
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
    Variable {
        name: String,
    },
    Video {
        url: String,
        #[serde(rename = "embedUrl")]
        embed_url: String,
        provider: VideoProvider,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Table {
        #[serde(
            rename = "colWidths",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        col_widths: Option<Vec<u32>>,
    },
    TableRow,
    TableCell {
        #[serde(default, skip_serializing_if = "is_false")]
        header: bool,
    },
}

impl ElementKind {
    pub fn paragraph() -> Self {
        ElementKind::Paragraph { align: None }
    }

    pub fn heading(level: u8) -> Self {
        ElementKind::Heading {
            level: level.clamp(1, 6),
            align: None,
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKind::Paragraph { .. } => ElementType::Paragraph,
            ElementKind::Heading { .. } => ElementType::Heading,
            ElementKind::Blockquote { .. } => ElementType::Blockquote,
            ElementKind::CodeBlock { .. } => ElementType::CodeBlock,
            ElementKind::BulletedList => ElementType::BulletedList,
            ElementKind::NumberedList => ElementType::NumberedList,
            ElementKind::ListItem { .. } => ElementType::ListItem,
            ElementKind::Link { .. } => ElementType::Link,
            ElementKind::Image { .. } => ElementType::Image,
            ElementKind::Variable { .. } => ElementType::Variable,
            ElementKind::Video { .. } => ElementType::Video,
            ElementKind::Table { .. } => ElementType::Table,
            ElementKind::TableRow => ElementType::TableRow,
            ElementKind::TableCell { .. } => ElementType::TableCell,
        }
    }

    pub fn align(&self) -> Option<Align> {
        match self {
            ElementKind::Paragraph { align }
            | ElementKind::Heading { align, .. }
            | ElementKind::Blockquote { align }
            | ElementKind::ListItem { align } => *align,
            _ => None,
        }
    }

    /// Returns the kind with `align` replaced, or `None` when the variant
    /// carries no alignment.
    pub fn with_align(&self, align: Option<Align>) -> Option<Self> {
        let mut next = self.clone();
        match &mut next {
            ElementKind::Paragraph { align: slot }
            | ElementKind::Heading { align: slot, .. }
            | ElementKind::Blockquote { align: slot }
            | ElementKind::ListItem { align: slot } => *slot = align,
            _ => return None,
        }
        Some(next)
    }

    pub fn heading_level(&self) -> Option<u8> {
        match self {
            ElementKind::Heading { level, .. } => Some(*level),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        self.element_type().is_list()
    }

    /// Retypes a text block, carrying alignment over when both variants
    /// support it. `level` only applies to headings.
    pub fn retyped(&self, target: ElementType, level: Option<u8>) -> Option<Self> {
        let align = self.align();
        let kind = match target {
            ElementType::Paragraph => ElementKind::Paragraph { align },
            ElementType::Heading => ElementKind::Heading {
                level: level.unwrap_or(1).clamp(1, 6),
                align,
            },
            ElementType::Blockquote => ElementKind::Blockquote { align },
            ElementType::CodeBlock => ElementKind::CodeBlock { language: None },
            ElementType::ListItem => ElementKind::ListItem { align },
            _ => return None,
        };
        Some(kind)
    }
}

/// Tag-only view of [`ElementKind`], used for classification and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementType {
    Paragraph,
    Heading,
    Blockquote,
    CodeBlock,
    BulletedList,
    NumberedList,
    ListItem,
    Link,
    Image,
    Variable,
    Video,
    Table,
    TableRow,
    TableCell,
}

pub const LIST_TYPES: [ElementType; 2] = [ElementType::BulletedList, ElementType::NumberedList];

pub const VOID_TYPES: [ElementType; 3] =
    [ElementType::Image, ElementType::Variable, ElementType::Video];

pub const INLINE_TYPES: [ElementType; 2] = [ElementType::Link, ElementType::Variable];

pub const ALIGNABLE_TYPES: [ElementType; 4] = [
    ElementType::Paragraph,
    ElementType::Heading,
    ElementType::Blockquote,
    ElementType::ListItem,
];

impl ElementType {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Paragraph => "paragraph",
            ElementType::Heading => "heading",
            ElementType::Blockquote => "blockquote",
            ElementType::CodeBlock => "code-block",
            ElementType::BulletedList => "bulleted-list",
            ElementType::NumberedList => "numbered-list",
            ElementType::ListItem => "list-item",
            ElementType::Link => "link",
            ElementType::Image => "image",
            ElementType::Variable => "variable",
            ElementType::Video => "video",
            ElementType::Table => "table",
            ElementType::TableRow => "table-row",
            ElementType::TableCell => "table-cell",
        }
    }

    pub fn is_list(self) -> bool {
        LIST_TYPES.contains(&self)
    }

    pub fn is_void(self) -> bool {
        VOID_TYPES.contains(&self)
    }

    pub fn is_inline(self) -> bool {
        INLINE_TYPES.contains(&self)
    }

    pub fn is_alignable(self) -> bool {
        ALIGNABLE_TYPES.contains(&self)
    }

    /// The variant with default fields, for container types that carry none.
    pub fn list_container(self) -> Option<ElementKind> {
        match self {
            ElementType::BulletedList => Some(ElementKind::BulletedList),
            ElementType::NumberedList => Some(ElementKind::NumberedList),
            _ => None,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
