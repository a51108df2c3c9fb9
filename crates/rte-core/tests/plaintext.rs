use pretty_assertions::assert_eq;
use rte_core::serializers::plaintext::serialize;
use rte_core::{Document, ElementKind, MarkType, Marks, Node, VideoProvider};

fn item(text: &str) -> Node {
    Node::element(ElementKind::ListItem { align: None }, vec![Node::text(text)])
}

#[test]
fn blocks_lists_and_placeholders() {
    let document = Document::new(vec![
        Node::paragraph("Hello"),
        Node::element(ElementKind::BulletedList, vec![item("a"), item("b")]),
        Node::void(ElementKind::Image {
            url: "https://example.com/a.png".to_string(),
            alt: None,
        }),
        Node::element(
            ElementKind::paragraph(),
            vec![
                Node::text("Hi "),
                Node::void(ElementKind::Variable {
                    name: "name".to_string(),
                }),
                Node::text(""),
            ],
        ),
        Node::void(ElementKind::Video {
            url: "https://vimeo.com/1".to_string(),
            embed_url: "https://player.vimeo.com/video/1".to_string(),
            provider: VideoProvider::Vimeo,
            caption: Some("ignored".to_string()),
        }),
    ]);

    assert_eq!(
        serialize(&document),
        "Hello\n\n  a\n  b\n\n[Image: https://example.com/a.png]\n\nHi {{name}}\n\n[Video: https://vimeo.com/1]"
    );
}

#[test]
fn formatting_and_link_targets_are_dropped() {
    let document = Document::new(vec![Node::element(
        ElementKind::paragraph(),
        vec![
            Node::styled("Bold", Marks::default().with(MarkType::Bold)),
            Node::text(" see "),
            Node::element(
                ElementKind::Link {
                    url: "https://example.com".to_string(),
                },
                vec![Node::text("docs")],
            ),
        ],
    )]);

    assert_eq!(serialize(&document), "Bold see docs");
}

#[test]
fn image_alt_wins_over_url() {
    let document = Document::new(vec![Node::void(ElementKind::Image {
        url: "https://example.com/a.png".to_string(),
        alt: Some("A cat".to_string()),
    })]);

    assert_eq!(serialize(&document), "[Image: A cat]");
}

#[test]
fn tables_read_cell_by_cell() {
    let cell = |text: &str| {
        Node::element(
            ElementKind::TableCell { header: false },
            vec![Node::paragraph(text)],
        )
    };
    let document = Document::new(vec![
        Node::paragraph("Before"),
        Node::element(
            ElementKind::Table { col_widths: None },
            vec![
                Node::element(ElementKind::TableRow, vec![cell("A"), cell("B")]),
                Node::element(ElementKind::TableRow, vec![cell("1"), cell("2")]),
            ],
        ),
    ]);

    assert_eq!(serialize(&document), "Before\n\nA\nB\n1\n2");
}

#[test]
fn empty_document_is_empty_text() {
    assert_eq!(serialize(&Document::default()), "");
}
