use crate::core::Editor;
use crate::error::ApplyError;
use crate::path;
use crate::plugin::{EditorPlugin, Intercept};
use crate::query;
use crate::schema::{ElementType, LIST_TYPES};
use crate::transforms;

/// Line prefixes that retype a paragraph when followed by a space.
pub const MARKDOWN_SHORTCUTS: [(&str, ElementType, Option<u8>); 11] = [
    ("#", ElementType::Heading, Some(1)),
    ("##", ElementType::Heading, Some(2)),
    ("###", ElementType::Heading, Some(3)),
    ("####", ElementType::Heading, Some(4)),
    ("#####", ElementType::Heading, Some(5)),
    ("######", ElementType::Heading, Some(6)),
    (">", ElementType::Blockquote, None),
    ("-", ElementType::BulletedList, None),
    ("*", ElementType::BulletedList, None),
    ("1.", ElementType::NumberedList, None),
    ("```", ElementType::CodeBlock, None),
];

pub fn shortcut_for(prefix: &str) -> Option<(ElementType, Option<u8>)> {
    MARKDOWN_SHORTCUTS
        .iter()
        .find(|(p, _, _)| *p == prefix)
        .map(|(_, ty, level)| (*ty, *level))
}

fn apply_shortcut(editor: &mut Editor) -> Result<bool, ApplyError> {
    let Some(caret) = editor
        .selection()
        .filter(|sel| sel.is_collapsed())
        .map(|sel| sel.anchor.clone())
    else {
        return Ok(false);
    };
    let Some((block, el)) = editor.block_above(path::parent(&caret.path)) else {
        return Ok(false);
    };
    if el.element_type() != ElementType::Paragraph {
        return Ok(false);
    }

    let prefix = editor.block_text_before(&block, &caret);
    let Some((ty, level)) = shortcut_for(&prefix) else {
        return Ok(false);
    };

    tracing::trace!(prefix = prefix.as_str(), block_type = %ty, "markdown shortcut");
    editor.batch(|editor| {
        transforms::delete_backward_in_block(editor, prefix.len())?;

        let retype_to = if LIST_TYPES.contains(&ty) {
            ElementType::ListItem
        } else {
            ty
        };
        if let Some(kind) = query::element_at_path(editor.doc(), &block)
            .and_then(|el| el.kind.retyped(retype_to, level))
        {
            transforms::set_element(editor, &block, kind)?;
        }

        if let (Some(container), Some(ix)) = (ty.list_container(), path::last_index(&block)) {
            transforms::wrap_nodes(editor, path::parent(&block), ix, ix, container)?;
        }
        Ok(())
    })?;
    Ok(true)
}

/// Markdown-style block shortcuts typed at the start of a plain paragraph,
/// e.g. `## ` for a level-two heading. The triggering space is consumed.
pub struct ShortcutsPlugin;

impl EditorPlugin for ShortcutsPlugin {
    fn id(&self) -> &'static str {
        "shortcuts"
    }

    fn insert_text(&self, editor: &mut Editor, text: &str) -> Result<Intercept, ApplyError> {
        if text == " " && apply_shortcut(editor)? {
            return Ok(Intercept::Handled);
        }
        Ok(Intercept::Continue)
    }
}
