use crate::core::Editor;
use crate::error::ApplyError;
use crate::path::{self, Path};
use crate::plugin::{CommandSpec, EditorPlugin, command_result};
use crate::query;
use crate::schema::{ElementKind, ElementType};
use crate::transforms;

/// The list item holding the selection start, with its container's kind.
fn current_list_item(editor: &Editor) -> Option<(Path, ElementKind)> {
    let start = editor.selection()?.start();
    let (item, _) = query::closest_element(editor.doc(), path::parent(&start.path), |el| {
        el.element_type() == ElementType::ListItem
    })?;
    let parent = query::element_at_path(editor.doc(), path::parent(&item))?;
    parent.kind.is_list().then(|| (item, parent.kind.clone()))
}

/// Nests the current item one level deeper, inside a new container of the
/// same list type. Returns false outside a list.
pub fn indent_list_item(editor: &mut Editor) -> Result<bool, ApplyError> {
    let Some((item, container)) = current_list_item(editor) else {
        return Ok(false);
    };
    let Some(ix) = path::last_index(&item) else {
        return Ok(false);
    };
    let parent = path::parent(&item).to_vec();
    editor.batch(|editor| transforms::wrap_nodes(editor, &parent, ix, ix, container))?;
    Ok(true)
}

/// Lifts the current item out of its nested container. Only an item whose
/// container sits inside another list moves; a list at the top level, or
/// directly inside a table cell or quote, keeps its items, since lifting
/// would leave a bare list item outside any list. Returns false then.
pub fn outdent_list_item(editor: &mut Editor) -> Result<bool, ApplyError> {
    let Some((item, _)) = current_list_item(editor) else {
        return Ok(false);
    };
    let list = path::parent(&item);
    let nested = list.len() >= 2
        && query::element_at_path(editor.doc(), path::parent(list))
            .is_some_and(|el| el.kind.is_list());
    if !nested {
        tracing::debug!(?item, "outdent ignored at the top list level");
        return Ok(false);
    }
    editor.batch(|editor| transforms::lift_node(editor, &item))?;
    Ok(true)
}

pub struct ListsPlugin;

impl EditorPlugin for ListsPlugin {
    fn id(&self) -> &'static str {
        "lists"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("list.indent", "Indent list item", |editor, _args| {
                command_result("indent list item", indent_list_item(editor))
            })
            .description("Nest the current list item one level deeper.")
            .keywords(["list", "indent", "nest", "tab"]),
            CommandSpec::new("list.outdent", "Outdent list item", |editor, _args| {
                command_result("outdent list item", outdent_list_item(editor))
            })
            .description("Move the current list item up one nesting level.")
            .keywords(["list", "outdent", "unindent", "lift"]),
        ]
    }
}
