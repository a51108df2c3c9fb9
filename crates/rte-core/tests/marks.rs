use pretty_assertions::assert_eq;
use rte_core::{
    DEFAULT_FONT_SIZE, Document, Editor, FONT_SIZE_SCALE, MAX_FONT_SIZE, MIN_FONT_SIZE, MarkType,
    Marks, Node, PluginRegistry, Point, Selection, decrease_font_size, get_current_font_color,
    get_current_font_size, increase_font_size, is_mark_active, query, set_font_color,
    set_font_size, toggle_mark,
};

fn editor_with(doc: Document, anchor: Point, focus: Point) -> Editor {
    Editor::new(
        doc,
        Some(Selection::new(anchor, focus)),
        PluginRegistry::richtext(),
    )
}

/// Non-empty runs with their marks, in document order.
fn runs(editor: &Editor) -> Vec<(String, Marks)> {
    query::texts(editor.doc())
        .into_iter()
        .filter(|(_, t)| !t.text.is_empty())
        .map(|(_, t)| (t.text.clone(), t.marks.clone()))
        .collect()
}

fn bold() -> Marks {
    Marks::default().with(MarkType::Bold)
}

#[test]
fn toggle_mark_on_range_splits_the_run() {
    let mut editor = editor_with(
        Document::new(vec![Node::paragraph("hello world")]),
        Point::new(vec![0, 0], 0),
        Point::new(vec![0, 0], 5),
    );

    toggle_mark(&mut editor, MarkType::Bold).unwrap();

    assert_eq!(
        runs(&editor),
        vec![
            ("hello".to_string(), bold()),
            (" world".to_string(), Marks::default()),
        ]
    );
    assert!(is_mark_active(&editor, MarkType::Bold));
    assert!(!is_mark_active(&editor, MarkType::Italic));
}

#[test]
fn toggling_twice_restores_the_document() {
    let original = Document::new(vec![Node::paragraph("hello world")]);
    let mut editor = editor_with(
        original.clone(),
        Point::new(vec![0, 0], 2),
        Point::new(vec![0, 0], 8),
    );

    toggle_mark(&mut editor, MarkType::Italic).unwrap();
    assert!(is_mark_active(&editor, MarkType::Italic));

    toggle_mark(&mut editor, MarkType::Italic).unwrap();
    assert!(!is_mark_active(&editor, MarkType::Italic));
    assert_eq!(editor.doc(), &original);
}

#[test]
fn collapsed_toggle_applies_to_the_next_typed_text() {
    let mut editor = Editor::with_richtext_plugins();

    toggle_mark(&mut editor, MarkType::Bold).unwrap();
    assert!(is_mark_active(&editor, MarkType::Bold));
    assert_eq!(editor.doc(), &Document::default());

    editor.insert_text("hi").unwrap();
    assert_eq!(runs(&editor), vec![("hi".to_string(), bold())]);
}

#[test]
fn mark_command_and_query() {
    let mut editor = editor_with(
        Document::new(vec![Node::paragraph("abc")]),
        Point::new(vec![0, 0], 0),
        Point::new(vec![0, 0], 3),
    );

    editor
        .run_command(
            "marks.toggle",
            Some(serde_json::json!({ "mark": "strikethrough" })),
        )
        .unwrap();
    assert!(
        editor
            .run_query::<bool>(
                "marks.is_active",
                Some(serde_json::json!({ "mark": "strikethrough" }))
            )
            .unwrap()
    );

    let err = editor
        .run_command("marks.toggle", Some(serde_json::json!({ "mark": "blink" })))
        .unwrap_err();
    assert_eq!(err.message(), "Unknown mark: blink");
}

#[test]
fn range_marks_span_blocks() {
    let mut editor = editor_with(
        Document::new(vec![Node::paragraph("one"), Node::paragraph("two")]),
        Point::new(vec![0, 0], 1),
        Point::new(vec![1, 0], 2),
    );

    toggle_mark(&mut editor, MarkType::Underline).unwrap();

    let underline = Marks::default().with(MarkType::Underline);
    assert_eq!(
        runs(&editor),
        vec![
            ("o".to_string(), Marks::default()),
            ("ne".to_string(), underline.clone()),
            ("tw".to_string(), underline),
            ("o".to_string(), Marks::default()),
        ]
    );
}

#[test]
fn font_size_steps_through_the_scale() {
    let mut editor = Editor::with_richtext_plugins();
    assert_eq!(get_current_font_size(&editor), DEFAULT_FONT_SIZE);

    increase_font_size(&mut editor).unwrap();
    assert_eq!(get_current_font_size(&editor), 18);
    increase_font_size(&mut editor).unwrap();
    assert_eq!(get_current_font_size(&editor), 20);

    set_font_size(&mut editor, Some(16.0)).unwrap();
    assert_eq!(get_current_font_size(&editor), DEFAULT_FONT_SIZE);

    decrease_font_size(&mut editor).unwrap();
    assert_eq!(get_current_font_size(&editor), 14);
}

#[test]
fn font_size_off_the_scale_moves_by_two() {
    let mut editor = Editor::with_richtext_plugins();

    set_font_size(&mut editor, Some(96.0)).unwrap();
    increase_font_size(&mut editor).unwrap();
    assert_eq!(get_current_font_size(&editor), 98);

    set_font_size(&mut editor, Some(8.0)).unwrap();
    decrease_font_size(&mut editor).unwrap();
    assert_eq!(get_current_font_size(&editor), 6);

    set_font_size(&mut editor, Some(999.0)).unwrap();
    assert_eq!(get_current_font_size(&editor), 200);
}

#[test]
fn font_size_walks_every_step_and_stops_at_the_bounds() {
    let mut editor = Editor::with_richtext_plugins();
    set_font_size(&mut editor, Some(f64::from(FONT_SIZE_SCALE[0]))).unwrap();

    for next in &FONT_SIZE_SCALE[1..] {
        increase_font_size(&mut editor).unwrap();
        assert_eq!(get_current_font_size(&editor), *next);
    }
    for expected in (98..=MAX_FONT_SIZE).step_by(2) {
        increase_font_size(&mut editor).unwrap();
        assert_eq!(get_current_font_size(&editor), expected);
    }
    increase_font_size(&mut editor).unwrap();
    increase_font_size(&mut editor).unwrap();
    assert_eq!(get_current_font_size(&editor), MAX_FONT_SIZE);

    decrease_font_size(&mut editor).unwrap();
    assert_eq!(get_current_font_size(&editor), 96);
    for previous in FONT_SIZE_SCALE.iter().rev().skip(1) {
        decrease_font_size(&mut editor).unwrap();
        assert_eq!(get_current_font_size(&editor), *previous);
    }
    for expected in [6, 4, 2, MIN_FONT_SIZE, MIN_FONT_SIZE] {
        decrease_font_size(&mut editor).unwrap();
        assert_eq!(get_current_font_size(&editor), expected);
    }

    increase_font_size(&mut editor).unwrap();
    assert_eq!(get_current_font_size(&editor), FONT_SIZE_SCALE[0]);
}

#[test]
fn font_size_on_range_is_stored_on_runs() {
    let mut editor = editor_with(
        Document::new(vec![Node::paragraph("big")]),
        Point::new(vec![0, 0], 0),
        Point::new(vec![0, 0], 3),
    );

    set_font_size(&mut editor, Some(23.6)).unwrap();

    let expected = Marks {
        font_size: Some(24),
        ..Marks::default()
    };
    assert_eq!(runs(&editor), vec![("big".to_string(), expected)]);

    set_font_size(&mut editor, None).unwrap();
    assert_eq!(runs(&editor), vec![("big".to_string(), Marks::default())]);
}

#[test]
fn font_color_set_and_clear() {
    let mut editor = editor_with(
        Document::new(vec![Node::paragraph("red")]),
        Point::new(vec![0, 0], 0),
        Point::new(vec![0, 0], 3),
    );

    set_font_color(&mut editor, Some("#ff0000")).unwrap();
    assert_eq!(get_current_font_color(&editor), Some("#ff0000".to_string()));

    editor
        .run_command("font_color.set", Some(serde_json::json!({ "color": null })))
        .unwrap();
    assert_eq!(get_current_font_color(&editor), None);
    assert_eq!(runs(&editor), vec![("red".to_string(), Marks::default())]);
}
