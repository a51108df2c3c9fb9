use pretty_assertions::assert_eq;
use rte_core::{
    Document, Editor, ElementKind, ElementType, Node, ParsedVideo, VideoProvider, insert_video,
    parse_video_url, provider_display_name,
};

fn parsed(url: &str) -> Option<(VideoProvider, String)> {
    parse_video_url(url).map(|p| (p.provider, p.embed_url))
}

#[test]
fn hosted_providers() {
    let cases = [
        (
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            VideoProvider::Youtube,
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
        ),
        (
            "https://youtu.be/dQw4w9WgXcQ?t=42",
            VideoProvider::Youtube,
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
        ),
        (
            "https://youtube.com/shorts/abcdefghijk",
            VideoProvider::Youtube,
            "https://www.youtube-nocookie.com/embed/abcdefghijk",
        ),
        (
            "https://vimeo.com/76979871",
            VideoProvider::Vimeo,
            "https://player.vimeo.com/video/76979871",
        ),
        (
            "https://player.vimeo.com/video/76979871",
            VideoProvider::Vimeo,
            "https://player.vimeo.com/video/76979871",
        ),
        (
            "https://www.dailymotion.com/video/x7tgad0",
            VideoProvider::Dailymotion,
            "https://www.dailymotion.com/embed/video/x7tgad0",
        ),
        (
            "https://dai.ly/x7tgad0",
            VideoProvider::Dailymotion,
            "https://www.dailymotion.com/embed/video/x7tgad0",
        ),
        (
            "https://www.loom.com/share/abc123def",
            VideoProvider::Loom,
            "https://www.loom.com/embed/abc123def",
        ),
        (
            "https://home.wistia.com/medias/e4a27b971d",
            VideoProvider::Wistia,
            "https://fast.wistia.net/embed/iframe/e4a27b971d",
        ),
    ];

    for (url, provider, embed) in cases {
        assert_eq!(parsed(url), Some((provider, embed.to_string())), "{url}");
    }
}

#[test]
fn direct_files_embed_themselves() {
    assert_eq!(
        parse_video_url("https://cdn.example.com/clip.MP4?token=abc"),
        Some(ParsedVideo {
            url: "https://cdn.example.com/clip.MP4?token=abc".to_string(),
            embed_url: "https://cdn.example.com/clip.MP4?token=abc".to_string(),
            provider: VideoProvider::Direct,
        })
    );
    assert_eq!(
        parsed("https://example.com/a.webm"),
        Some((VideoProvider::Direct, "https://example.com/a.webm".to_string()))
    );
}

#[test]
fn unrecognized_urls() {
    assert_eq!(parse_video_url(""), None);
    assert_eq!(parse_video_url("   "), None);
    assert_eq!(parse_video_url("https://example.com/page"), None);
    assert_eq!(parse_video_url("https://youtube.com/watch?v=short"), None);
    assert_eq!(parse_video_url("https://example.com/clip.mp4.html"), None);
}

#[test]
fn input_is_trimmed() {
    let video = parse_video_url("  https://vimeo.com/123  ").unwrap();
    assert_eq!(video.url, "https://vimeo.com/123");
    assert_eq!(video.embed_url, "https://player.vimeo.com/video/123");
}

#[test]
fn display_names() {
    assert_eq!(provider_display_name(VideoProvider::Youtube), "YouTube");
    assert_eq!(provider_display_name(VideoProvider::Direct), "Video");
}

#[test]
fn insert_video_adds_block() {
    let mut editor = Editor::with_richtext_plugins();

    assert!(insert_video(&mut editor, "https://vimeo.com/1", Some("  Launch  ")).unwrap());

    assert_eq!(
        editor
            .doc()
            .children
            .iter()
            .filter_map(Node::element_type)
            .collect::<Vec<_>>(),
        vec![
            ElementType::Paragraph,
            ElementType::Video,
            ElementType::Paragraph
        ]
    );
    assert_eq!(
        editor.doc().children[1].kind(),
        Some(&ElementKind::Video {
            url: "https://vimeo.com/1".to_string(),
            embed_url: "https://player.vimeo.com/video/1".to_string(),
            provider: VideoProvider::Vimeo,
            caption: Some("Launch".to_string()),
        })
    );
}

#[test]
fn blank_caption_is_dropped() {
    let mut editor = Editor::with_richtext_plugins();

    assert!(insert_video(&mut editor, "https://example.com/a.mp4", Some("  ")).unwrap());
    assert_eq!(
        editor.doc().children[1].kind(),
        Some(&ElementKind::Video {
            url: "https://example.com/a.mp4".to_string(),
            embed_url: "https://example.com/a.mp4".to_string(),
            provider: VideoProvider::Direct,
            caption: None,
        })
    );
}

#[test]
fn unsupported_url_leaves_document_alone() {
    let mut editor = Editor::with_richtext_plugins();

    assert!(!insert_video(&mut editor, "https://example.com", None).unwrap());
    assert_eq!(editor.doc(), &Document::default());

    let err = editor
        .run_command(
            "video.insert",
            Some(serde_json::json!({ "url": "https://example.com" })),
        )
        .unwrap_err();
    assert_eq!(err.message(), "Unsupported video URL: https://example.com");
}

#[test]
fn parse_query_uses_camel_case() {
    let editor = Editor::with_richtext_plugins();

    assert_eq!(
        editor
            .run_query_json(
                "video.parse",
                Some(serde_json::json!({ "url": "https://youtu.be/dQw4w9WgXcQ" }))
            )
            .unwrap(),
        serde_json::json!({
            "url": "https://youtu.be/dQw4w9WgXcQ",
            "embedUrl": "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
            "provider": "youtube"
        })
    );
    assert_eq!(
        editor
            .run_query_json(
                "video.parse",
                Some(serde_json::json!({ "url": "not a video" }))
            )
            .unwrap(),
        serde_json::Value::Null
    );
}
