use pretty_assertions::assert_eq;
use rte_core::serializers::html::{deserialize, escape_html, serialize};
use rte_core::{Align, Document, Editor, ElementKind, MarkType, Marks, Node, VideoProvider};

fn doc(children: Vec<Node>) -> Document {
    Document::new(children)
}

fn p(children: Vec<Node>) -> Node {
    Node::element(ElementKind::paragraph(), children)
}

fn cell(header: bool, text: &str) -> Node {
    Node::element(ElementKind::TableCell { header }, vec![Node::paragraph(text)])
}

fn item(text: &str) -> Node {
    Node::element(ElementKind::ListItem { align: None }, vec![Node::text(text)])
}

fn normalized(doc: Document) -> Document {
    Editor::from_document(doc).doc().clone()
}

#[test]
fn escapes_markup_characters() {
    assert_eq!(
        escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;/a&gt;"
    );
}

#[test]
fn serializes_text_marks_in_fixed_order() {
    let all = Marks::default()
        .with(MarkType::Code)
        .with(MarkType::Bold)
        .with(MarkType::Italic)
        .with(MarkType::Underline)
        .with(MarkType::Strikethrough);

    assert_eq!(
        serialize(&doc(vec![p(vec![
            Node::text("Hello "),
            Node::styled("world", Marks::default().with(MarkType::Bold)),
        ])])),
        "<p>Hello <strong>world</strong></p>"
    );
    assert_eq!(
        serialize(&doc(vec![p(vec![Node::styled("x", all)])])),
        "<p><s><u><em><strong><code>x</code></strong></em></u></s></p>"
    );
}

#[test]
fn serializes_font_styles_on_a_span() {
    let marks = Marks {
        bold: true,
        font_size: Some(24),
        font_color: Some("#f00".to_string()),
        ..Marks::default()
    };

    assert_eq!(
        serialize(&doc(vec![p(vec![Node::styled("big", marks)])])),
        r#"<p><span style="font-size:24px;color:#f00"><strong>big</strong></span></p>"#
    );
}

#[test]
fn serializes_blocks_one_per_line() {
    let document = doc(vec![
        Node::element(
            ElementKind::Heading {
                level: 2,
                align: Some(Align::Center),
            },
            vec![Node::text("Title")],
        ),
        Node::element(ElementKind::BulletedList, vec![item("a"), item("b")]),
        Node::element(
            ElementKind::CodeBlock {
                language: Some("rust".to_string()),
            },
            vec![Node::text("if a < b {}")],
        ),
        Node::element(
            ElementKind::Blockquote { align: None },
            vec![Node::text("quoted")],
        ),
    ]);

    assert_eq!(
        serialize(&document),
        [
            r#"<h2 style="text-align:center">Title</h2>"#,
            "<ul><li>a</li><li>b</li></ul>",
            r#"<pre><code class="language-rust">if a &lt; b {}</code></pre>"#,
            "<blockquote>quoted</blockquote>",
        ]
        .join("\n")
    );
}

#[test]
fn serializes_inline_elements() {
    let document = doc(vec![p(vec![
        Node::text("See "),
        Node::element(
            ElementKind::Link {
                url: "https://example.com/?a=1&b=2".to_string(),
            },
            vec![Node::text("site")],
        ),
        Node::text(", "),
        Node::void(ElementKind::Variable {
            name: "first".to_string(),
        }),
        Node::text(""),
    ])]);

    assert_eq!(
        serialize(&document),
        r#"<p>See <a href="https://example.com/?a=1&amp;b=2">site</a>, <span data-variable="first">{{first}}</span></p>"#
    );
}

#[test]
fn serializes_media() {
    let document = doc(vec![
        Node::void(ElementKind::Image {
            url: "https://example.com/a.png".to_string(),
            alt: None,
        }),
        Node::void(ElementKind::Video {
            url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            embed_url: "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ".to_string(),
            provider: VideoProvider::Youtube,
            caption: Some("Demo".to_string()),
        }),
        Node::void(ElementKind::Video {
            url: "https://example.com/a.mp4".to_string(),
            embed_url: "https://example.com/a.mp4".to_string(),
            provider: VideoProvider::Direct,
            caption: None,
        }),
    ]);

    assert_eq!(
        serialize(&document),
        [
            r#"<img src="https://example.com/a.png" alt="" />"#,
            r#"<div data-video-provider="youtube" data-video-url="https://youtu.be/dQw4w9WgXcQ"><iframe src="https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ" frameborder="0" allowfullscreen></iframe><p>Demo</p></div>"#,
            r#"<div data-video-provider="direct" data-video-url="https://example.com/a.mp4"><video src="https://example.com/a.mp4" controls></video></div>"#,
        ]
        .join("\n")
    );
}

#[test]
fn serializes_tables() {
    let document = doc(vec![Node::element(
        ElementKind::Table {
            col_widths: Some(vec![100, 200]),
        },
        vec![
            Node::element(ElementKind::TableRow, vec![cell(true, "A"), cell(true, "B")]),
            Node::element(ElementKind::TableRow, vec![cell(false, "1"), cell(false, "")]),
        ],
    )]);

    assert_eq!(
        serialize(&document),
        concat!(
            r#"<table class="rte-table" data-col-widths="[100,200]"><tbody>"#,
            r#"<tr><th class="rte-table-cell"><p>A</p></th><th class="rte-table-cell"><p>B</p></th></tr>"#,
            r#"<tr><td class="rte-table-cell"><p>1</p></td><td class="rte-table-cell"><p></p></td></tr>"#,
            "</tbody></table>"
        )
    );
}

#[test]
fn deserializes_paragraphs_and_marks() {
    assert_eq!(
        deserialize("<p>Hello <strong>world</strong></p>"),
        doc(vec![p(vec![
            Node::text("Hello "),
            Node::styled("world", Marks::default().with(MarkType::Bold)),
        ])])
    );
    assert_eq!(
        deserialize("<p><b><i>x</i></b><del>y</del></p>"),
        doc(vec![p(vec![
            Node::styled(
                "x",
                Marks::default().with(MarkType::Bold).with(MarkType::Italic)
            ),
            Node::styled("y", Marks::default().with(MarkType::Strikethrough)),
        ])])
    );
}

#[test]
fn deserializes_styles() {
    assert_eq!(
        deserialize(r#"<h3 style="text-align: right">T</h3>"#),
        doc(vec![Node::element(
            ElementKind::Heading {
                level: 3,
                align: Some(Align::Right),
            },
            vec![Node::text("T")],
        )])
    );

    let expected = Marks {
        font_size: Some(18),
        font_color: Some("red".to_string()),
        ..Marks::default()
    };
    assert_eq!(
        deserialize(r#"<p><span style="font-size: 17.6px; color: red">r</span></p>"#),
        doc(vec![p(vec![Node::styled("r", expected)])])
    );

    let inner = Marks {
        font_color: Some("blue".to_string()),
        ..Marks::default()
    };
    assert_eq!(
        deserialize(r#"<p><span style="color:red"><span style="color:blue">x</span></span></p>"#),
        doc(vec![p(vec![Node::styled("x", inner)])])
    );
}

#[test]
fn formatting_whitespace_between_blocks_is_ignored() {
    let html = "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>\n<p>x <em>y</em></p>";

    assert_eq!(
        deserialize(html),
        doc(vec![
            Node::element(ElementKind::BulletedList, vec![item("a"), item("b")]),
            p(vec![
                Node::text("x "),
                Node::styled("y", Marks::default().with(MarkType::Italic)),
            ]),
        ])
    );
}

#[test]
fn deserializes_code_breaks_and_entities() {
    assert_eq!(
        deserialize(r#"<pre><code class="hljs language-rust">let x = 1;</code></pre>"#),
        doc(vec![Node::element(
            ElementKind::CodeBlock {
                language: Some("rust".to_string()),
            },
            vec![Node::text("let x = 1;")],
        )])
    );
    assert_eq!(
        deserialize("<p>a<br>b</p>").text_content(),
        "a\nb"
    );
    assert_eq!(
        deserialize("<p>a &amp; b &lt; c&#33;</p>").text_content(),
        "a & b < c!"
    );
}

#[test]
fn deserializes_inline_elements() {
    assert_eq!(
        deserialize(
            r#"<p>see <a href="https://example.com">site</a> <span data-variable="name">{{name}}</span></p>"#
        ),
        doc(vec![p(vec![
            Node::text("see "),
            Node::element(
                ElementKind::Link {
                    url: "https://example.com".to_string(),
                },
                vec![Node::text("site")],
            ),
            Node::text(" "),
            Node::void(ElementKind::Variable {
                name: "name".to_string(),
            }),
        ])])
    );
}

#[test]
fn deserializes_media() {
    assert_eq!(
        deserialize(r#"<img src="https://example.com/a.png" alt="">"#),
        doc(vec![Node::void(ElementKind::Image {
            url: "https://example.com/a.png".to_string(),
            alt: None,
        })])
    );

    assert_eq!(
        deserialize(
            r#"<div data-video-provider="vimeo" data-video-url="https://vimeo.com/1"><iframe src="https://player.vimeo.com/video/1"></iframe><p> Cap </p></div>"#
        ),
        doc(vec![Node::void(ElementKind::Video {
            url: "https://vimeo.com/1".to_string(),
            embed_url: "https://player.vimeo.com/video/1".to_string(),
            provider: VideoProvider::Vimeo,
            caption: Some(" Cap ".to_string()),
        })])
    );
}

#[test]
fn unknown_video_provider_falls_back_to_the_url() {
    assert_eq!(
        deserialize(
            r#"<div data-video-provider="acme" data-video-url="https://youtu.be/dQw4w9WgXcQ"></div>"#
        ),
        doc(vec![Node::void(ElementKind::Video {
            url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            embed_url: "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ".to_string(),
            provider: VideoProvider::Youtube,
            caption: None,
        })])
    );
}

#[test]
fn deserializes_tables() {
    let html = r#"<table data-col-widths="[50,60]">
        <tr><th>A</th><th>B</th></tr>
        <tr><td>1</td><td></td></tr>
    </table>"#;

    assert_eq!(
        deserialize(html),
        doc(vec![Node::element(
            ElementKind::Table {
                col_widths: Some(vec![50, 60]),
            },
            vec![
                Node::element(ElementKind::TableRow, vec![cell(true, "A"), cell(true, "B")]),
                Node::element(ElementKind::TableRow, vec![cell(false, "1"), cell(false, "")]),
            ],
        )])
    );
}

#[test]
fn mismatched_column_widths_are_dropped() {
    let html = r#"<table data-col-widths="[50]"><tr><td>1</td><td>2</td></tr></table>"#;

    let table = deserialize(html).children[0].clone();
    assert_eq!(table.kind(), Some(&ElementKind::Table { col_widths: None }));
}

#[test]
fn decodes_named_character_references() {
    assert_eq!(
        deserialize("<p>caf&eacute; &hearts; &lt;ok&gt;</p>").text_content(),
        "caf\u{e9} \u{2665} <ok>"
    );
    assert_eq!(
        deserialize(r#"<p><a href="https://example.com/?a=1&amp;b=&pound;">x</a></p>"#),
        doc(vec![p(vec![Node::element(
            ElementKind::Link {
                url: "https://example.com/?a=1&b=\u{a3}".to_string(),
            },
            vec![Node::text("x")],
        )])])
    );
}

#[test]
fn empty_and_junk_input_gives_default_document() {
    assert_eq!(deserialize(""), Document::default());
    assert_eq!(deserialize("  \n "), Document::default());
    assert_eq!(deserialize("<!-- nothing -->"), Document::default());
    assert_eq!(deserialize("<div></div>"), Document::default());
}

#[test]
fn loose_text_and_dropped_elements() {
    assert_eq!(deserialize("hello"), doc(vec![Node::paragraph("hello")]));
    assert_eq!(
        deserialize("<script>alert(1)</script><section><p>x</p></section>"),
        doc(vec![Node::paragraph("x")])
    );
}

#[test]
fn round_trip_preserves_the_document() {
    let original = doc(vec![
        Node::element(
            ElementKind::Heading {
                level: 1,
                align: Some(Align::Center),
            },
            vec![Node::text("Title")],
        ),
        p(vec![
            Node::text("Hello "),
            Node::styled(
                "big",
                Marks {
                    bold: true,
                    font_size: Some(24),
                    ..Marks::default()
                },
            ),
            Node::text(" a < b"),
        ]),
        p(vec![
            Node::text("See "),
            Node::element(
                ElementKind::Link {
                    url: "https://example.com".to_string(),
                },
                vec![Node::text("site")],
            ),
            Node::text(" and "),
            Node::void(ElementKind::Variable {
                name: "name".to_string(),
            }),
            Node::text("!"),
        ]),
        Node::element(ElementKind::NumberedList, vec![item("one"), item("two")]),
        Node::element(
            ElementKind::CodeBlock {
                language: Some("rust".to_string()),
            },
            vec![Node::text("fn main() {}")],
        ),
        Node::void(ElementKind::Image {
            url: "https://example.com/c.png".to_string(),
            alt: Some("Cat".to_string()),
        }),
        Node::void(ElementKind::Video {
            url: "https://example.com/a.mp4".to_string(),
            embed_url: "https://example.com/a.mp4".to_string(),
            provider: VideoProvider::Direct,
            caption: Some("Clip".to_string()),
        }),
        Node::element(
            ElementKind::Table {
                col_widths: Some(vec![100, 200]),
            },
            vec![
                Node::element(ElementKind::TableRow, vec![cell(true, "A"), cell(true, "B")]),
                Node::element(ElementKind::TableRow, vec![cell(false, "1"), cell(false, "2")]),
            ],
        ),
    ]);

    let html = serialize(&original);
    assert_eq!(normalized(deserialize(&html)), normalized(original));
}

#[test]
fn round_trip_covers_marks_alignment_and_embeds() {
    let aligned_item = |text: &str| {
        Node::element(
            ElementKind::ListItem {
                align: Some(Align::Right),
            },
            vec![Node::text(text)],
        )
    };
    let original = doc(vec![
        p(vec![
            Node::styled("it", Marks::default().with(MarkType::Italic)),
            Node::text(" "),
            Node::styled("under", Marks::default().with(MarkType::Underline)),
            Node::text(" "),
            Node::styled("gone", Marks::default().with(MarkType::Strikethrough)),
            Node::text(" "),
            Node::styled("code", Marks::default().with(MarkType::Code)),
            Node::text(" "),
            Node::styled(
                "red",
                Marks {
                    font_color: Some("#ff0000".to_string()),
                    ..Marks::default()
                },
            ),
        ]),
        Node::element(
            ElementKind::Blockquote {
                align: Some(Align::Center),
            },
            vec![Node::text("quoted")],
        ),
        Node::element(
            ElementKind::BulletedList,
            vec![item("plain"), aligned_item("right")],
        ),
        Node::void(ElementKind::Video {
            url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            embed_url: "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ".to_string(),
            provider: VideoProvider::Youtube,
            caption: Some(" Spaced caption ".to_string()),
        }),
    ]);

    let html = serialize(&original);
    assert_eq!(normalized(deserialize(&html)), normalized(original));
}
