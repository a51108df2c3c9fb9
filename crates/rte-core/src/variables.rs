use std::sync::LazyLock;

use regex::Regex;

use crate::core::Editor;
use crate::error::{ApplyError, CommandError};
use crate::path;
use crate::plugin::{CommandSpec, EditorPlugin, Intercept, command_result, require_str};
use crate::schema::{ElementKind, Node};
use crate::transforms;

static VARIABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([a-zA-Z_][\w.]*)\}\}$").expect("variable regex must compile")
});

/// Inserts a variable placeholder and parks the caret after it.
pub fn insert_variable(editor: &mut Editor, name: &str) -> Result<(), ApplyError> {
    let node = Node::void(ElementKind::Variable {
        name: name.to_string(),
    });
    transforms::insert_inline(editor, node)
}

/// Replaces a `{{name}` just before the caret, completed by the typed
/// `}`, with a variable. Returns whether it did.
fn convert_typed_variable(editor: &mut Editor) -> Result<bool, ApplyError> {
    let Some(caret) = editor
        .selection()
        .filter(|sel| sel.is_collapsed())
        .map(|sel| sel.anchor.clone())
    else {
        return Ok(false);
    };
    if editor.void_above(path::parent(&caret.path)).is_some() {
        return Ok(false);
    }
    let Some((block, _)) = editor.block_above(path::parent(&caret.path)) else {
        return Ok(false);
    };

    let mut text = editor.block_text_before(&block, &caret);
    text.push('}');
    let Some(caps) = VARIABLE_RE.captures(&text) else {
        return Ok(false);
    };
    let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
        return Ok(false);
    };
    let name = name.as_str().to_string();
    // The final brace is the one being typed and is not in the document yet.
    let typed_len = whole.as_str().len() - 1;

    tracing::trace!(name = name.as_str(), "converting typed variable");
    editor.batch(|editor| {
        transforms::delete_backward_in_block(editor, typed_len)?;
        insert_variable(editor, &name)
    })?;
    Ok(true)
}

pub struct VariablesPlugin;

impl EditorPlugin for VariablesPlugin {
    fn id(&self) -> &'static str {
        "variables"
    }

    fn insert_text(&self, editor: &mut Editor, text: &str) -> Result<Intercept, ApplyError> {
        if text == "}" && convert_typed_variable(editor)? {
            return Ok(Intercept::Handled);
        }
        Ok(Intercept::Continue)
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("variable.insert", "Insert variable", |editor, args| {
                let name = require_str(args.as_ref(), "name")?;
                let name = name.trim();
                if name.is_empty() {
                    return Err(CommandError::new("Variable name must not be empty"));
                }
                command_result("insert variable", insert_variable(editor, name))
            })
            .description("Insert a template variable placeholder at the caret.")
            .keywords(["variable", "placeholder", "template", "merge field"])
            .args_example(serde_json::json!({ "name": "firstName" })),
        ]
    }
}
