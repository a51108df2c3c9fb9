use pretty_assertions::assert_eq;
use rte_core::{
    Document, Editor, ElementKind, Node, PluginRegistry, Point, Selection, indent_list_item,
    outdent_list_item,
};

fn item(text: &str) -> Node {
    Node::element(ElementKind::ListItem { align: None }, vec![Node::text(text)])
}

fn bulleted(children: Vec<Node>) -> Node {
    Node::element(ElementKind::BulletedList, children)
}

fn caret(doc: Document, path: Vec<usize>, offset: usize) -> Editor {
    Editor::new(
        doc,
        Some(Selection::collapsed(Point::new(path, offset))),
        PluginRegistry::richtext(),
    )
}

#[test]
fn indent_nests_item_in_same_list_type() {
    let mut editor = caret(
        Document::new(vec![bulleted(vec![item("a"), item("b")])]),
        vec![0, 1, 0],
        0,
    );

    assert!(indent_list_item(&mut editor).unwrap());
    assert_eq!(
        editor.doc(),
        &Document::new(vec![bulleted(vec![item("a"), bulleted(vec![item("b")])])])
    );
}

#[test]
fn outdent_reverses_indent() {
    let original = Document::new(vec![bulleted(vec![item("a"), item("b"), item("c")])]);
    let mut editor = caret(original.clone(), vec![0, 1, 0], 1);

    assert!(indent_list_item(&mut editor).unwrap());
    assert!(outdent_list_item(&mut editor).unwrap());
    assert_eq!(editor.doc(), &original);
}

#[test]
fn numbered_lists_nest_as_numbered() {
    let mut editor = caret(
        Document::new(vec![Node::element(
            ElementKind::NumberedList,
            vec![item("one"), item("two")],
        )]),
        vec![0, 1, 0],
        0,
    );

    editor.run_command("list.indent", None).unwrap();

    let list = editor.doc().children[0].as_element().unwrap();
    assert_eq!(list.children[1].kind(), Some(&ElementKind::NumberedList));
}

#[test]
fn outdent_at_top_level_is_ignored() {
    let original = Document::new(vec![bulleted(vec![item("a")])]);
    let mut editor = caret(original.clone(), vec![0, 0, 0], 0);

    assert!(!outdent_list_item(&mut editor).unwrap());
    assert_eq!(editor.doc(), &original);
    assert!(!editor.can_undo());
}

#[test]
fn outdent_inside_a_table_cell_keeps_the_list() {
    let cell = |children: Vec<Node>| {
        Node::element(ElementKind::TableCell { header: false }, children)
    };
    let mut editor = caret(
        Document::new(vec![Node::element(
            ElementKind::Table { col_widths: None },
            vec![Node::element(
                ElementKind::TableRow,
                vec![
                    cell(vec![bulleted(vec![item("a")])]),
                    cell(vec![Node::paragraph("")]),
                ],
            )],
        )]),
        vec![0, 0, 0, 0, 0, 0],
        0,
    );
    let loaded = editor.doc().clone();

    assert!(!outdent_list_item(&mut editor).unwrap());
    assert_eq!(editor.doc(), &loaded);
    assert!(!editor.can_undo());
}

#[test]
fn indent_outside_a_list_is_ignored() {
    let original = Document::new(vec![Node::paragraph("plain")]);
    let mut editor = caret(original.clone(), vec![0, 0], 0);

    assert!(!indent_list_item(&mut editor).unwrap());
    assert_eq!(editor.doc(), &original);
}

#[test]
fn nested_outdent_lifts_middle_item() {
    let mut editor = caret(
        Document::new(vec![bulleted(vec![
            item("a"),
            bulleted(vec![item("b"), item("c"), item("d")]),
        ])]),
        vec![0, 1, 1, 0],
        0,
    );

    assert!(outdent_list_item(&mut editor).unwrap());
    assert_eq!(
        editor.doc(),
        &Document::new(vec![bulleted(vec![
            item("a"),
            bulleted(vec![item("b")]),
            item("c"),
            bulleted(vec![item("d")]),
        ])])
    );
}
