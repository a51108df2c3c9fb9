use pretty_assertions::assert_eq;
use rte_core::{
    DEFAULT_COL_WIDTH, Document, Editor, Element, ElementKind, ElementType, Node, TableDimensions,
    TableSelection, delete_column, delete_row, delete_table, get_table_selection,
    insert_column_left, insert_column_right, insert_row_above, insert_row_below, insert_table,
    is_in_table, resize_table_column, select_next_table_cell, select_previous_table_cell,
    set_table_column_widths, table_column_widths,
};

fn table_editor(rows: usize, cols: usize) -> Editor {
    let mut editor = Editor::with_richtext_plugins();
    insert_table(&mut editor, rows, cols).unwrap();
    editor
}

fn table(editor: &Editor) -> &Element {
    editor.doc().children[1].as_element().unwrap()
}

fn row_lengths(editor: &Editor) -> Vec<usize> {
    table(editor)
        .children
        .iter()
        .map(|row| row.children().len())
        .collect()
}

fn position(editor: &Editor) -> (usize, usize) {
    let sel = get_table_selection(editor).unwrap();
    (sel.row_index, sel.col_index)
}

#[test]
fn insert_table_places_caret_in_first_cell() {
    let editor = table_editor(3, 3);

    assert_eq!(
        editor
            .doc()
            .children
            .iter()
            .filter_map(Node::element_type)
            .collect::<Vec<_>>(),
        vec![ElementType::Paragraph, ElementType::Table]
    );
    assert_eq!(
        get_table_selection(&editor),
        Some(TableSelection {
            table_path: vec![1],
            row_index: 0,
            col_index: 0,
            rows: 3,
            cols: 3,
        })
    );
    assert_eq!(
        table(&editor).kind,
        ElementKind::Table {
            col_widths: Some(vec![DEFAULT_COL_WIDTH; 3])
        }
    );
    assert!(is_in_table(&editor));

    let cell = &table(&editor).children[0].children()[0];
    assert_eq!(
        cell,
        &Node::element(
            ElementKind::TableCell { header: false },
            vec![Node::paragraph("")]
        )
    );
}

#[test]
fn insert_size_is_clamped() {
    let editor = table_editor(1, 20);
    assert_eq!(row_lengths(&editor), vec![6, 6]);

    let editor = table_editor(99, 0);
    assert_eq!(row_lengths(&editor), vec![2; 10]);
}

#[test]
fn outside_a_table_edits_are_ignored() {
    let mut editor = Editor::with_richtext_plugins();

    assert!(!is_in_table(&editor));
    assert_eq!(get_table_selection(&editor), None);
    assert!(!insert_row_below(&mut editor).unwrap());
    assert!(!delete_column(&mut editor).unwrap());
    assert!(!select_next_table_cell(&mut editor).unwrap());
    assert_eq!(editor.doc(), &Document::default());
}

#[test]
fn row_inserts_keep_grid_rectangular() {
    let mut editor = table_editor(2, 3);

    assert!(insert_row_below(&mut editor).unwrap());
    assert_eq!(row_lengths(&editor), vec![3, 3, 3]);
    assert_eq!(position(&editor), (0, 0));

    assert!(insert_row_above(&mut editor).unwrap());
    assert_eq!(row_lengths(&editor), vec![3, 3, 3, 3]);
    assert_eq!(position(&editor), (1, 0));
}

#[test]
fn column_inserts_keep_widths_aligned() {
    let mut editor = table_editor(2, 2);
    assert!(set_table_column_widths(&mut editor, &[1], &[100, 200]).unwrap());

    assert!(insert_column_right(&mut editor).unwrap());
    assert_eq!(row_lengths(&editor), vec![3, 3]);
    assert_eq!(table_column_widths(table(&editor)), vec![100, 120, 200]);

    assert!(insert_column_left(&mut editor).unwrap());
    assert_eq!(row_lengths(&editor), vec![4, 4]);
    assert_eq!(table_column_widths(table(&editor)), vec![120, 100, 120, 200]);
    assert_eq!(position(&editor), (0, 1));
}

#[test]
fn deletes_respect_the_floors() {
    let mut editor = table_editor(2, 3);
    assert!(set_table_column_widths(&mut editor, &[1], &[100, 200, 300]).unwrap());

    assert!(select_next_table_cell(&mut editor).unwrap());
    assert!(delete_column(&mut editor).unwrap());
    assert_eq!(row_lengths(&editor), vec![2, 2]);
    assert_eq!(table_column_widths(table(&editor)), vec![100, 300]);
    assert!(!delete_column(&mut editor).unwrap());

    assert!(delete_row(&mut editor).unwrap());
    assert_eq!(row_lengths(&editor), vec![2]);
    assert!(!delete_row(&mut editor).unwrap());
}

#[test]
fn tab_walks_cells_and_grows_the_table() {
    let mut editor = table_editor(2, 2);

    assert!(!select_previous_table_cell(&mut editor).unwrap());

    assert!(select_next_table_cell(&mut editor).unwrap());
    assert_eq!(position(&editor), (0, 1));
    assert!(select_next_table_cell(&mut editor).unwrap());
    assert_eq!(position(&editor), (1, 0));
    assert!(select_next_table_cell(&mut editor).unwrap());
    assert_eq!(position(&editor), (1, 1));

    assert!(select_next_table_cell(&mut editor).unwrap());
    assert_eq!(position(&editor), (2, 0));
    assert_eq!(row_lengths(&editor), vec![2, 2, 2]);

    assert!(select_previous_table_cell(&mut editor).unwrap());
    assert_eq!(position(&editor), (1, 1));
}

#[test]
fn resize_trades_width_with_the_right_neighbour() {
    let mut editor = table_editor(2, 3);

    assert!(resize_table_column(&mut editor, &[1], 0, 40).unwrap());
    assert_eq!(table_column_widths(table(&editor)), vec![160, 80, 120]);

    assert!(resize_table_column(&mut editor, &[1], 0, 100).unwrap());
    assert_eq!(table_column_widths(table(&editor)), vec![216, 24, 120]);

    assert!(!resize_table_column(&mut editor, &[1], 0, 10).unwrap());
    assert!(!resize_table_column(&mut editor, &[1], 2, 10).unwrap());
    assert!(!resize_table_column(&mut editor, &[0], 0, 10).unwrap());

    assert!(resize_table_column(&mut editor, &[1], 0, -500).unwrap());
    assert_eq!(table_column_widths(table(&editor)), vec![24, 216, 120]);
}

#[test]
fn explicit_widths_are_floored_and_counted() {
    let mut editor = table_editor(2, 3);

    assert!(set_table_column_widths(&mut editor, &[1], &[10, 200, 300]).unwrap());
    assert_eq!(table_column_widths(table(&editor)), vec![24, 200, 300]);

    assert!(!set_table_column_widths(&mut editor, &[1], &[100, 100]).unwrap());
    assert_eq!(table_column_widths(table(&editor)), vec![24, 200, 300]);
}

#[test]
fn missing_or_stale_widths_fall_back_to_default() {
    let row = Node::element(
        ElementKind::TableRow,
        vec![
            Node::element(ElementKind::TableCell { header: true }, vec![Node::paragraph("a")]),
            Node::element(ElementKind::TableCell { header: true }, vec![Node::paragraph("b")]),
        ],
    );
    let plain = Element::new(ElementKind::Table { col_widths: None }, vec![row.clone()]);
    assert_eq!(table_column_widths(&plain), vec![120, 120]);

    let stale = Element::new(
        ElementKind::Table {
            col_widths: Some(vec![10, 20, 30]),
        },
        vec![row],
    );
    assert_eq!(table_column_widths(&stale), vec![120, 120]);
}

#[test]
fn ragged_rows_are_padded_on_load() {
    let cell = |text: &str| {
        Node::element(
            ElementKind::TableCell { header: false },
            vec![Node::paragraph(text)],
        )
    };
    let editor = Editor::from_document(Document::new(vec![Node::element(
        ElementKind::Table {
            col_widths: Some(vec![100, 100, 100]),
        },
        vec![
            Node::element(ElementKind::TableRow, vec![cell("a"), cell("b")]),
            Node::element(ElementKind::TableRow, vec![cell("c")]),
        ],
    )]));

    let table = editor.doc().children[0].as_element().unwrap();
    let lengths: Vec<usize> = table.children.iter().map(|r| r.children().len()).collect();
    assert_eq!(lengths, vec![2, 2]);
    assert_eq!(table.kind, ElementKind::Table { col_widths: None });
}

#[test]
fn delete_table_removes_the_grid() {
    let mut editor = table_editor(2, 2);

    assert!(delete_table(&mut editor).unwrap());
    assert_eq!(editor.doc(), &Document::default());
    assert!(!is_in_table(&editor));
}

#[test]
fn table_commands_and_queries() {
    let mut editor = Editor::with_richtext_plugins();

    editor
        .run_command("table.insert", Some(serde_json::json!({ "rows": 2, "cols": 4 })))
        .unwrap();
    assert!(editor.run_query::<bool>("table.is_in", None).unwrap());
    assert_eq!(
        editor
            .run_query::<Option<TableDimensions>>("table.dimensions", None)
            .unwrap(),
        Some(TableDimensions { rows: 2, cols: 4 })
    );
    assert_eq!(
        editor.run_query_json("table.selection", None).unwrap(),
        serde_json::json!({
            "tablePath": [1],
            "rowIndex": 0,
            "colIndex": 0,
            "rows": 2,
            "cols": 4
        })
    );

    editor
        .run_command(
            "table.resize_column",
            Some(serde_json::json!({ "col": 1, "delta": -20 })),
        )
        .unwrap();
    assert_eq!(
        editor
            .run_query::<Option<Vec<u32>>>("table.column_widths", None)
            .unwrap(),
        Some(vec![120, 100, 140, 120])
    );

    let err = editor
        .run_command("table.set_column_widths", Some(serde_json::json!({})))
        .unwrap_err();
    assert_eq!(err.message(), "Missing args.widths");

    editor.run_command("table.delete", None).unwrap();
    let err = editor
        .run_command("table.resize_column", Some(serde_json::json!({ "col": 0, "delta": 1 })))
        .unwrap_err();
    assert_eq!(err.message(), "Selection is not inside a table");
}

#[test]
fn table_insert_undoes_in_one_step() {
    let mut editor = table_editor(3, 3);

    assert!(editor.undo());
    assert_eq!(editor.doc(), &Document::default());
    assert!(editor.redo());
    assert_eq!(row_lengths(&editor), vec![3, 3, 3]);
}
