use pretty_assertions::assert_eq;
use rte_core::{
    Document, Editor, ElementKind, ElementType, Node, PluginRegistry, Point, Selection,
    shortcut_for,
};

fn typed(inputs: &[&str]) -> Editor {
    let mut editor = Editor::with_richtext_plugins();
    for input in inputs {
        editor.insert_text(input).unwrap();
    }
    editor
}

fn item(text: &str) -> Node {
    Node::element(ElementKind::ListItem { align: None }, vec![Node::text(text)])
}

#[test]
fn shortcut_table() {
    assert_eq!(shortcut_for("###"), Some((ElementType::Heading, Some(3))));
    assert_eq!(shortcut_for("*"), Some((ElementType::BulletedList, None)));
    assert_eq!(shortcut_for(">"), Some((ElementType::Blockquote, None)));
    assert_eq!(shortcut_for("#######"), None);
    assert_eq!(shortcut_for("2."), None);
}

#[test]
fn hash_space_makes_a_heading() {
    let editor = typed(&["#", " ", "Title"]);

    assert_eq!(
        editor.doc(),
        &Document::new(vec![Node::element(
            ElementKind::Heading {
                level: 1,
                align: None
            },
            vec![Node::text("Title")],
        )])
    );
}

#[test]
fn deeper_heading_levels() {
    let editor = typed(&["###", " "]);

    assert_eq!(
        editor.doc().children[0].kind(),
        Some(&ElementKind::Heading {
            level: 3,
            align: None
        })
    );
}

#[test]
fn dash_space_starts_a_bulleted_list() {
    let editor = typed(&["-", " ", "a"]);

    assert_eq!(
        editor.doc(),
        &Document::new(vec![Node::element(
            ElementKind::BulletedList,
            vec![item("a")]
        )])
    );
}

#[test]
fn number_space_starts_a_numbered_list() {
    let editor = typed(&["1.", " ", "one"]);

    assert_eq!(
        editor.doc(),
        &Document::new(vec![Node::element(
            ElementKind::NumberedList,
            vec![item("one")]
        )])
    );
}

#[test]
fn fence_and_quote_shortcuts() {
    let editor = typed(&["```", " "]);
    assert_eq!(
        editor.doc().children[0].kind(),
        Some(&ElementKind::CodeBlock { language: None })
    );

    let editor = typed(&[">", " "]);
    assert_eq!(
        editor.doc().children[0].element_type(),
        Some(ElementType::Blockquote)
    );
}

#[test]
fn shortcuts_only_fire_in_paragraphs() {
    let editor = typed(&["#", " ", "#", " "]);

    assert_eq!(
        editor.doc(),
        &Document::new(vec![Node::element(
            ElementKind::Heading {
                level: 1,
                align: None
            },
            vec![Node::text("# ")],
        )])
    );
}

#[test]
fn prefix_must_start_the_block() {
    let editor = typed(&["a#", " "]);

    assert_eq!(editor.doc(), &Document::new(vec![Node::paragraph("a# ")]));
}

#[test]
fn text_after_the_caret_is_kept() {
    let mut editor = Editor::new(
        Document::new(vec![Node::paragraph("##Notes")]),
        Some(Selection::collapsed(Point::new(vec![0, 0], 2))),
        PluginRegistry::richtext(),
    );

    editor.insert_text(" ").unwrap();

    assert_eq!(
        editor.doc(),
        &Document::new(vec![Node::element(
            ElementKind::Heading {
                level: 2,
                align: None
            },
            vec![Node::text("Notes")],
        )])
    );
}

#[test]
fn shortcut_undoes_to_the_typed_prefix() {
    let mut editor = typed(&["-", " "]);

    assert!(editor.undo());
    assert_eq!(editor.doc(), &Document::new(vec![Node::paragraph("-")]));
}
