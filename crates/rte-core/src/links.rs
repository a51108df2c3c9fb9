use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::core::{Editor, Selection};
use crate::error::ApplyError;
use crate::path::{self, Path};
use crate::plugin::{
    CommandSpec, EditorPlugin, Intercept, PasteData, QuerySpec, arg_str, command_result,
    require_str,
};
use crate::query::{self, Affinity};
use crate::schema::{ElementKind, ElementType, Node};
use crate::transforms;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://[^\s/$.?#][^\s]*$").expect("url regex must compile")
});

/// Absolute `http`/`https` URL with a host and no whitespace.
pub fn is_url(text: &str) -> bool {
    URL_RE.is_match(text)
}

/// Links that enclose any run covered by the selection, in document order.
fn links_in_selection(editor: &Editor) -> Vec<Path> {
    let Some(selection) = editor.selection() else {
        return Vec::new();
    };
    let (start, end) = selection.ordered();
    let mut out: Vec<Path> = Vec::new();
    for (run, _) in query::texts_between(editor.doc(), &start, &end) {
        let found = query::closest_of_type(editor.doc(), path::parent(&run), ElementType::Link);
        if let Some(link) = found {
            if !out.contains(&link) {
                out.push(link);
            }
        }
    }
    out
}

pub fn is_link_active(editor: &Editor) -> bool {
    !links_in_selection(editor).is_empty()
}

/// Removes every link touching the selection, keeping the link text.
pub fn unwrap_link(editor: &mut Editor) -> Result<(), ApplyError> {
    let links = links_in_selection(editor);
    if links.is_empty() {
        return Ok(());
    }
    editor.batch(|editor| {
        for link in links.into_iter().rev() {
            transforms::unwrap_node(editor, &link)?;
        }
        Ok(())
    })
}

/// Links the selection to `url`. Existing links in the selection are
/// removed first, so links never nest. A collapsed caret gets a new link
/// showing the URL itself.
pub fn wrap_link(editor: &mut Editor, url: &str) -> Result<(), ApplyError> {
    if editor.selection().is_none() {
        return Ok(());
    }
    editor.batch(|editor| {
        unwrap_link(editor)?;
        let Some(selection) = editor.selection().cloned() else {
            return Ok(());
        };
        let kind = ElementKind::Link {
            url: url.to_string(),
        };
        if selection.is_collapsed() {
            return transforms::insert_inline(editor, Node::element(kind, vec![Node::text(url)]));
        }

        let (start, end) = selection.ordered();
        let runs = transforms::isolate_range(editor, &start, &end)?;

        // One contiguous range of block children per block.
        let mut groups: Vec<(Path, usize, usize)> = Vec::new();
        for run in &runs {
            let Some((block, block_el)) = editor.block_above(path::parent(run)) else {
                continue;
            };
            if editor.is_void(block_el) {
                continue;
            }
            let ix = run[block.len()];
            match groups.last_mut() {
                Some((b, _, last)) if *b == block => *last = ix,
                _ => groups.push((block, ix, ix)),
            }
        }

        let mut last_link: Option<Path> = None;
        for (block, first, last) in groups.into_iter().rev() {
            let link = transforms::wrap_nodes(editor, &block, first, last, kind.clone())?;
            if last_link.is_none() {
                last_link = Some(link);
            }
        }
        match last_link {
            Some(link) => transforms::select_after_inline(editor, &link),
            None => Ok(()),
        }
    })
}

/// Links the selection, or at a collapsed caret inserts a link reading
/// `text` (the URL when absent).
pub fn insert_link(editor: &mut Editor, url: &str, text: Option<&str>) -> Result<(), ApplyError> {
    let expanded = editor.selection().is_some_and(|sel| !sel.is_collapsed());
    if expanded {
        return wrap_link(editor, url);
    }
    let label = text.filter(|t| !t.is_empty()).unwrap_or(url);
    let link = Node::element(
        ElementKind::Link {
            url: url.to_string(),
        },
        vec![Node::text(label)],
    );
    editor.batch(|editor| {
        unwrap_link(editor)?;
        if editor.selection().is_none() {
            return transforms::insert_nodes(editor, vec![link]);
        }
        transforms::insert_inline(editor, link)
    })
}

/// Turns the whitespace-delimited word before the caret into a link when
/// it reads as a URL. Returns whether it did.
fn autolink_word_before_caret(editor: &mut Editor) -> Result<bool, ApplyError> {
    let Some(caret) = editor
        .selection()
        .filter(|sel| sel.is_collapsed())
        .map(|sel| sel.anchor.clone())
    else {
        return Ok(false);
    };
    if query::closest_of_type(editor.doc(), path::parent(&caret.path), ElementType::Link).is_some() {
        return Ok(false);
    }
    let Some((block, _)) = editor.block_above(path::parent(&caret.path)) else {
        return Ok(false);
    };

    let before = editor.block_text_before(&block, &caret);
    let word_start = before
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(ix, c)| ix + c.len_utf8());
    let word = before[word_start..].to_string();
    if !is_url(&word) {
        return Ok(false);
    }

    let caret_offset = editor.offset_in_block(&block, &caret);
    let Some(start) = editor.point_at_block_offset(
        &block,
        caret_offset - word.len(),
        Affinity::Forward,
    ) else {
        return Ok(false);
    };
    tracing::trace!(url = word.as_str(), "auto-linking typed url");
    editor.set_selection_raw(Some(Selection::new(start, caret)));
    wrap_link(editor, &word)?;
    Ok(true)
}

pub struct LinksPlugin;

impl EditorPlugin for LinksPlugin {
    fn id(&self) -> &'static str {
        "links"
    }

    fn insert_text(&self, editor: &mut Editor, text: &str) -> Result<Intercept, ApplyError> {
        if text == " " {
            autolink_word_before_caret(editor)?;
        }
        Ok(Intercept::Continue)
    }

    fn insert_data(&self, editor: &mut Editor, data: &PasteData) -> Result<Intercept, ApplyError> {
        let Some(url) = data.text.as_deref().map(str::trim).filter(|t| is_url(t)) else {
            return Ok(Intercept::Continue);
        };
        let expanded = editor.selection().is_some_and(|sel| !sel.is_collapsed());
        if expanded {
            wrap_link(editor, url)?;
        } else {
            insert_link(editor, url, None)?;
        }
        Ok(Intercept::Handled)
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("link.insert", "Insert link", |editor, args| {
                let url = require_str(args.as_ref(), "url")?;
                let text = arg_str(args.as_ref(), "text");
                command_result("insert link", insert_link(editor, &url, text))
            })
            .description("Link the selection, or insert a link at the caret.")
            .keywords(["link", "url", "href", "anchor"])
            .args_example(serde_json::json!({ "url": "https://example.com", "text": "Example" })),
            CommandSpec::new("link.wrap", "Wrap in link", |editor, args| {
                let url = require_str(args.as_ref(), "url")?;
                command_result("wrap link", wrap_link(editor, &url))
            })
            .description("Wrap the selection in a link, replacing any existing link.")
            .keywords(["link", "url"])
            .args_example(serde_json::json!({ "url": "https://example.com" })),
            CommandSpec::new("link.unwrap", "Remove link", |editor, _args| {
                command_result("remove link", unwrap_link(editor))
            })
            .description("Remove links from the selection, keeping their text.")
            .keywords(["link", "unlink", "remove"]),
        ]
    }

    fn queries(&self) -> Vec<QuerySpec> {
        vec![QuerySpec::new("link.is_active", |editor, _args| {
            Ok(Value::Bool(is_link_active(editor)))
        })]
    }
}
