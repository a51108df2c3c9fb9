//! Lenient HTML fragment parser.
//!
//! Malformed markup never fails: unknown constructs are skipped, unclosed
//! elements close at the end of input, and stray end tags are ignored. The
//! tree-building rules cover what rich-text markup needs: void and raw-text
//! elements, implicit closing of `p`, `li`, table rows and cells, and
//! character references.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DomNode {
    Element(DomElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct DomElement {
    /// Lowercased tag name.
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<DomNode>,
}

impl DomElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// First descendant element named `name`, depth first.
    pub fn find(&self, name: &str) -> Option<&DomElement> {
        for child in &self.children {
            if let DomNode::Element(el) = child {
                if el.name == name {
                    return Some(el);
                }
                if let Some(found) = el.find(name) {
                    return Some(found);
                }
            }
        }
        None
    }
}

fn collect_text(nodes: &[DomNode], out: &mut String) {
    for node in nodes {
        match node {
            DomNode::Text(t) => out.push_str(t),
            DomNode::Element(el) => collect_text(&el.children, out),
        }
    }
}

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "textarea", "title"];

/// Parsed but dropped from the tree along with their content.
const DROPPED_ELEMENTS: [&str; 5] = ["head", "script", "style", "template", "title"];

const CLOSES_P: [&str; 30] = [
    "address", "article", "aside", "blockquote", "details", "div", "dl", "dd", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "ul",
];

const P_SCOPE_BOUNDARY: [&str; 6] = ["button", "caption", "html", "table", "td", "th"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End(String),
    Text(String),
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_'
}

fn read_name(s: &str) -> &str {
    let end = s.find(|c: char| !is_name_char(c)).unwrap_or(s.len());
    &s[..end]
}

fn tokenize(src: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < src.len() {
        let rest = &src[pos..];

        if let Some(after) = rest.strip_prefix("<!--") {
            pos += 4 + after.find("-->").map_or(after.len(), |ix| ix + 3);
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            pos += rest.find('>').map_or(rest.len(), |ix| ix + 1);
            continue;
        }
        if let Some(after) = rest.strip_prefix("</") {
            if after.starts_with(|c: char| c.is_ascii_alphabetic()) {
                let name = read_name(after).to_ascii_lowercase();
                pos += rest.find('>').map_or(rest.len(), |ix| ix + 1);
                tokens.push(Token::End(name));
                continue;
            }
        }
        if rest.starts_with('<') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            let (token, consumed) = start_tag(rest);
            pos += consumed;
            if let Token::Start {
                name,
                self_closing: false,
                ..
            } = &token
            {
                if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                    let name = name.clone();
                    let body = &src[pos..];
                    let close = format!("</{name}");
                    let end = body.to_ascii_lowercase().find(&close).unwrap_or(body.len());
                    let raw = &body[..end];
                    tokens.push(token);
                    if !raw.is_empty() {
                        tokens.push(Token::Text(decode_entities(raw)));
                    }
                    tokens.push(Token::End(name));
                    pos += end;
                    if pos < src.len() {
                        pos += src[pos..].find('>').map_or(src.len() - pos, |ix| ix + 1);
                    }
                    continue;
                }
            }
            tokens.push(token);
            continue;
        }

        let first = rest.chars().next().map_or(1, char::len_utf8);
        let end = rest[first..].find('<').map_or(rest.len(), |ix| ix + first);
        tokens.push(Token::Text(decode_entities(&rest[..end])));
        pos += end;
    }
    tokens
}

/// Parses `<name attr=value ...>` at the start of `s`. Returns the token and
/// the bytes consumed.
fn start_tag(s: &str) -> (Token, usize) {
    let name = read_name(&s[1..]).to_ascii_lowercase();
    let mut pos = 1 + name.len();
    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        let rest = &s[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        let rest = trimmed;

        if rest.is_empty() {
            break;
        }
        if rest.starts_with("/>") {
            self_closing = true;
            pos += 2;
            break;
        }
        if rest.starts_with('>') {
            pos += 1;
            break;
        }
        if rest.starts_with('/') {
            pos += 1;
            continue;
        }

        let name_len = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(rest.len());
        if name_len == 0 {
            pos += rest.chars().next().map_or(1, char::len_utf8);
            continue;
        }
        let attr_name = rest[..name_len].to_ascii_lowercase();
        pos += name_len;

        let rest = &s[pos..];
        let trimmed = rest.trim_start();
        let mut value = String::new();
        if let Some(after_eq) = trimmed.strip_prefix('=') {
            let after_eq_trimmed = after_eq.trim_start();
            pos += rest.len() - after_eq_trimmed.len();
            let v = after_eq_trimmed;
            if let Some(quote) = v.chars().next().filter(|c| *c == '"' || *c == '\'') {
                let body = &v[1..];
                let end = body.find(quote).unwrap_or(body.len());
                value = decode_entities(&body[..end]);
                pos += 1 + end + usize::from(end < body.len());
            } else {
                let end = v
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(v.len());
                value = decode_entities(&v[..end]);
                pos += end;
            }
        }
        if !attrs.iter().any(|(k, _)| *k == attr_name) {
            attrs.push((attr_name, value));
        }
    }

    (
        Token::Start {
            name,
            attrs,
            self_closing,
        },
        pos,
    )
}

pub(crate) fn decode_entities(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<DomNode>,
    open: Vec<DomElement>,
}

impl TreeBuilder {
    fn children(&mut self) -> &mut Vec<DomNode> {
        match self.open.last_mut() {
            Some(el) => &mut el.children,
            None => &mut self.root,
        }
    }

    fn close_top(&mut self) {
        let Some(el) = self.open.pop() else {
            return;
        };
        if !DROPPED_ELEMENTS.contains(&el.name.as_str()) {
            self.children().push(DomNode::Element(el));
        }
    }

    /// Closes `open[ix]` and everything opened after it.
    fn close_to(&mut self, ix: usize) {
        while self.open.len() > ix {
            self.close_top();
        }
    }

    /// Innermost open element named one of `names`, unless a `boundary`
    /// element is open inside it.
    fn find_open(&self, names: &[&str], boundary: &[&str]) -> Option<usize> {
        for (ix, el) in self.open.iter().enumerate().rev() {
            if names.contains(&el.name.as_str()) {
                return Some(ix);
            }
            if boundary.contains(&el.name.as_str()) {
                return None;
            }
        }
        None
    }

    fn start(&mut self, name: String, attrs: Vec<(String, String)>, self_closing: bool) {
        if CLOSES_P.contains(&name.as_str()) {
            if let Some(ix) = self.find_open(&["p"], &P_SCOPE_BOUNDARY) {
                self.close_to(ix);
            }
        }
        let implied = match name.as_str() {
            "li" => self.find_open(&["li"], &["ul", "ol", "table"]),
            "td" | "th" => self.find_open(&["td", "th"], &["tr", "table"]),
            "tr" => self.find_open(&["tr"], &["table"]),
            "thead" | "tbody" | "tfoot" => self.find_open(&["thead", "tbody", "tfoot"], &["table"]),
            _ => None,
        };
        if let Some(ix) = implied {
            self.close_to(ix);
        }

        let el = DomElement {
            name,
            attrs,
            children: Vec::new(),
        };
        if self_closing || VOID_ELEMENTS.contains(&el.name.as_str()) {
            self.children().push(DomNode::Element(el));
        } else {
            self.open.push(el);
        }
    }

    fn end(&mut self, name: &str) {
        if let Some(ix) = self.open.iter().rposition(|el| el.name == name) {
            self.close_to(ix);
        }
    }

    fn text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        let children = self.children();
        if let Some(DomNode::Text(prev)) = children.last_mut() {
            prev.push_str(&text);
        } else {
            children.push(DomNode::Text(text));
        }
    }

    fn finish(mut self) -> Vec<DomNode> {
        self.close_to(0);
        self.root
    }
}

pub(crate) fn parse_fragment(src: &str) -> Vec<DomNode> {
    let mut builder = TreeBuilder::default();
    for token in tokenize(src) {
        match token {
            Token::Start {
                name,
                attrs,
                self_closing,
            } => builder.start(name, attrs, self_closing),
            Token::End(name) => builder.end(&name),
            Token::Text(text) => builder.text(text),
        }
    }
    builder.finish()
}
