use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::Editor;
use crate::error::{ApplyError, CommandError, QueryError};
use crate::plugin::{CommandSpec, EditorPlugin, QuerySpec, arg_str, require_str};
use crate::schema::{ElementKind, Node, VideoProvider};
use crate::transforms;

/// A recognized video URL with the address to embed it from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedVideo {
    pub url: String,
    pub embed_url: String,
    pub provider: VideoProvider,
}

/// Display names for the provider picker.
pub const VIDEO_PROVIDERS: [(VideoProvider, &str); 6] = [
    (VideoProvider::Youtube, "YouTube"),
    (VideoProvider::Vimeo, "Vimeo"),
    (VideoProvider::Dailymotion, "Dailymotion"),
    (VideoProvider::Loom, "Loom"),
    (VideoProvider::Wistia, "Wistia"),
    (VideoProvider::Direct, "Video"),
];

pub fn provider_display_name(provider: VideoProvider) -> &'static str {
    VIDEO_PROVIDERS
        .iter()
        .find(|(p, _)| *p == provider)
        .map_or("Video", |(_, name)| name)
}

struct ProviderPattern {
    provider: VideoProvider,
    re: Regex,
    embed_prefix: &'static str,
}

static PROVIDER_PATTERNS: LazyLock<Vec<ProviderPattern>> = LazyLock::new(|| {
    let pattern = |provider, re: &str, embed_prefix| ProviderPattern {
        provider,
        re: Regex::new(re).expect("video provider regex must compile"),
        embed_prefix,
    };
    vec![
        pattern(
            VideoProvider::Youtube,
            r"(?:youtube\.com/(?:watch\?v=|embed/|shorts/|v/)|youtu\.be/|youtube-nocookie\.com/embed/)([a-zA-Z0-9_-]{11})",
            "https://www.youtube-nocookie.com/embed/",
        ),
        pattern(
            VideoProvider::Vimeo,
            r"(?:vimeo\.com/(?:video/)?|player\.vimeo\.com/video/)(\d+)",
            "https://player.vimeo.com/video/",
        ),
        pattern(
            VideoProvider::Dailymotion,
            r"(?:dailymotion\.com/(?:video|embed/video)/|dai\.ly/)([a-zA-Z0-9]+)",
            "https://www.dailymotion.com/embed/video/",
        ),
        pattern(
            VideoProvider::Loom,
            r"loom\.com/(?:share|embed)/([a-zA-Z0-9]+)",
            "https://www.loom.com/embed/",
        ),
        pattern(
            VideoProvider::Wistia,
            r"(?:wistia\.com/medias|wi\.st/medias|wistia\.com/embed/iframe)/([a-zA-Z0-9]+)",
            "https://fast.wistia.net/embed/iframe/",
        ),
    ]
});

static DIRECT_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(mp4|webm|ogg|mov|m4v)(\?.*)?$").expect("video file regex must compile")
});

/// Recognizes a hosted-video or direct video-file URL. The first matching
/// provider wins; anything else, including blank input, is `None`.
pub fn parse_video_url(url: &str) -> Option<ParsedVideo> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    for pattern in PROVIDER_PATTERNS.iter() {
        let Some(id) = pattern.re.captures(trimmed).and_then(|caps| caps.get(1)) else {
            continue;
        };
        return Some(ParsedVideo {
            url: trimmed.to_string(),
            embed_url: format!("{}{}", pattern.embed_prefix, id.as_str()),
            provider: pattern.provider,
        });
    }

    if DIRECT_FILE_RE.is_match(trimmed) {
        return Some(ParsedVideo {
            url: trimmed.to_string(),
            embed_url: trimmed.to_string(),
            provider: VideoProvider::Direct,
        });
    }

    None
}

/// Inserts a video block followed by an empty paragraph. Returns false,
/// leaving the document untouched, when the URL is not a recognized video.
pub fn insert_video(editor: &mut Editor, url: &str, caption: Option<&str>) -> Result<bool, ApplyError> {
    let Some(parsed) = parse_video_url(url) else {
        tracing::debug!(url, "not a recognized video url");
        return Ok(false);
    };
    let video = Node::void(ElementKind::Video {
        url: parsed.url,
        embed_url: parsed.embed_url,
        provider: parsed.provider,
        caption: caption
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
    });
    editor.batch(|editor| {
        transforms::insert_nodes(editor, vec![video])?;
        transforms::insert_nodes(editor, vec![Node::paragraph("")])
    })?;
    Ok(true)
}

pub struct VideoPlugin;

impl EditorPlugin for VideoPlugin {
    fn id(&self) -> &'static str {
        "video"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("video.insert", "Insert video", |editor, args| {
                let url = require_str(args.as_ref(), "url")?;
                let caption = arg_str(args.as_ref(), "caption");
                match insert_video(editor, &url, caption) {
                    Ok(true) => Ok(()),
                    Ok(false) => Err(CommandError::new(format!("Unsupported video URL: {url}"))),
                    Err(err) => Err(CommandError::new(format!("Failed to insert video: {err}"))),
                }
            })
            .description("Embed a YouTube, Vimeo, Dailymotion, Loom, Wistia or video-file URL.")
            .keywords(["video", "embed", "youtube", "vimeo", "movie"])
            .args_example(serde_json::json!({
                "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
                "caption": "Demo"
            })),
        ]
    }

    fn queries(&self) -> Vec<QuerySpec> {
        vec![QuerySpec::new("video.parse", |_editor, args| {
            let url = arg_str(args.as_ref(), "url")
                .ok_or_else(|| QueryError::new("Missing string argument `url`"))?;
            match parse_video_url(url) {
                Some(parsed) => serde_json::to_value(parsed)
                    .map_err(|err| QueryError::new(format!("Failed to encode video: {err}"))),
                None => Ok(Value::Null),
            }
        })]
    }
}
