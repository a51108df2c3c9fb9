use pretty_assertions::assert_eq;
use rte_core::{Document, Editor, ElementKind, Node, insert_variable};

fn variable(name: &str) -> Option<ElementKind> {
    Some(ElementKind::Variable {
        name: name.to_string(),
    })
}

#[test]
fn closing_brace_converts_typed_variable() {
    let mut editor = Editor::with_richtext_plugins();

    editor.insert_text("Hi {{user.name}").unwrap();
    editor.insert_text("}").unwrap();

    let paragraph = &editor.doc().children[0];
    assert_eq!(paragraph.children()[1].kind().cloned(), variable("user.name"));
    assert_eq!(editor.doc().text_content(), "Hi ");

    editor.insert_text("!").unwrap();
    assert_eq!(editor.doc().text_content(), "Hi !");
    assert_eq!(
        editor.doc().children[0].children()[2],
        Node::text("!")
    );
}

#[test]
fn invalid_names_stay_text() {
    let mut editor = Editor::with_richtext_plugins();

    editor.insert_text("{{1abc}").unwrap();
    editor.insert_text("}").unwrap();
    assert_eq!(editor.doc(), &Document::new(vec![Node::paragraph("{{1abc}}")]));
}

#[test]
fn brace_without_opening_is_plain_text() {
    let mut editor = Editor::with_richtext_plugins();

    editor.insert_text("name}").unwrap();
    editor.insert_text("}").unwrap();
    assert_eq!(editor.doc(), &Document::new(vec![Node::paragraph("name}}")]));
}

#[test]
fn conversion_undoes_to_typed_text() {
    let mut editor = Editor::with_richtext_plugins();

    editor.insert_text("{{name}").unwrap();
    editor.insert_text("}").unwrap();
    assert!(editor.undo());

    assert_eq!(editor.doc(), &Document::new(vec![Node::paragraph("{{name}")]));
}

#[test]
fn insert_variable_at_caret() {
    let mut editor = Editor::with_richtext_plugins();

    insert_variable(&mut editor, "firstName").unwrap();
    editor.insert_text("x").unwrap();

    assert_eq!(
        editor.doc().children[0].children(),
        &[
            Node::text(""),
            Node::void(ElementKind::Variable {
                name: "firstName".to_string()
            }),
            Node::text("x"),
        ]
    );
}

#[test]
fn variable_command_rejects_blank_name() {
    let mut editor = Editor::with_richtext_plugins();

    let err = editor
        .run_command("variable.insert", Some(serde_json::json!({ "name": "  " })))
        .unwrap_err();
    assert_eq!(err.message(), "Variable name must not be empty");

    editor
        .run_command("variable.insert", Some(serde_json::json!({ "name": " id " })))
        .unwrap();
    assert_eq!(
        editor.doc().children[0].children()[1].kind().cloned(),
        variable("id")
    );
}
