use std::sync::LazyLock;

use base64::Engine as _;
use regex::Regex;

use crate::core::Editor;
use crate::error::ApplyError;
use crate::plugin::{
    CommandSpec, EditorPlugin, Intercept, PasteData, PastedFile, arg_str, command_result,
    require_str,
};
use crate::schema::{ElementKind, Node};
use crate::transforms;

static URL_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://[^/?#\s]+(/[^?#\s]*)?(\?[^#\s]*)?(#\S*)?$")
        .expect("url path regex must compile")
});

static IMAGE_EXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(png|jpe?g|gif|svg|webp|bmp|ico)$").expect("image extension regex must compile")
});

/// True for an absolute URL whose path ends in a known image extension.
/// The query string and fragment are ignored.
pub fn is_image_url(url: &str) -> bool {
    let Some(caps) = URL_PATH_RE.captures(url.trim()) else {
        return false;
    };
    caps.get(1)
        .is_some_and(|path| IMAGE_EXT_RE.is_match(path.as_str()))
}

/// Inserts an image block followed by an empty paragraph for the caret to
/// land in. An empty `alt` is stored as absent.
pub fn insert_image(editor: &mut Editor, url: &str, alt: Option<&str>) -> Result<(), ApplyError> {
    let image = Node::void(ElementKind::Image {
        url: url.to_string(),
        alt: alt.filter(|a| !a.is_empty()).map(str::to_string),
    });
    editor.batch(|editor| {
        transforms::insert_nodes(editor, vec![image])?;
        transforms::insert_nodes(editor, vec![Node::paragraph("")])
    })
}

/// `data:` URL carrying the file's bytes.
pub fn image_data_url(file: &PastedFile) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(&file.bytes);
    format!("data:{};base64,{}", file.mime, encoded)
}

pub struct ImagesPlugin;

impl EditorPlugin for ImagesPlugin {
    fn id(&self) -> &'static str {
        "images"
    }

    fn insert_data(&self, editor: &mut Editor, data: &PasteData) -> Result<Intercept, ApplyError> {
        if !data.files.is_empty() {
            for file in &data.files {
                if !file.mime.starts_with("image/") {
                    tracing::debug!(mime = file.mime.as_str(), "skipping pasted non-image file");
                    continue;
                }
                insert_image(editor, &image_data_url(file), None)?;
            }
            return Ok(Intercept::Handled);
        }

        match data.text.as_deref().map(str::trim) {
            Some(url) if is_image_url(url) => {
                insert_image(editor, url, None)?;
                Ok(Intercept::Handled)
            }
            _ => Ok(Intercept::Continue),
        }
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("image.insert", "Insert image", |editor, args| {
                let url = require_str(args.as_ref(), "url")?;
                let alt = arg_str(args.as_ref(), "alt");
                command_result("insert image", insert_image(editor, &url, alt))
            })
            .description("Insert an image block at the caret.")
            .keywords(["image", "picture", "photo", "img"])
            .args_example(serde_json::json!({
                "url": "https://example.com/photo.png",
                "alt": "A photo"
            })),
        ]
    }
}
