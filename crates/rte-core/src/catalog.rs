use serde::Serialize;

use crate::blocks::toggle_block;
use crate::core::Editor;
use crate::error::ApplyError;
use crate::schema::ElementType;
use crate::table::{DEFAULT_COLS, DEFAULT_ROWS, insert_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlashCategory {
    Basic,
    Lists,
    Media,
    Advanced,
}

/// What choosing a slash entry does. `Prompt*` entries need input from the
/// user before anything is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SlashAction {
    Block {
        block: ElementType,
        level: Option<u8>,
    },
    InsertTable,
    PromptLink,
    PromptImage,
    PromptVideo,
    PromptVariable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlashCommand {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub category: SlashCategory,
    pub keywords: &'static [&'static str],
    pub action: SlashAction,
}

const fn block(block: ElementType, level: Option<u8>) -> SlashAction {
    SlashAction::Block { block, level }
}

pub const SLASH_COMMANDS: [SlashCommand; 13] = [
    SlashCommand {
        id: "paragraph",
        label: "Paragraph",
        description: "Plain text block",
        category: SlashCategory::Basic,
        keywords: &["p", "paragraph", "text", "normal"],
        action: block(ElementType::Paragraph, None),
    },
    SlashCommand {
        id: "heading-1",
        label: "Heading 1",
        description: "Large section heading",
        category: SlashCategory::Basic,
        keywords: &["h1", "heading", "title", "large"],
        action: block(ElementType::Heading, Some(1)),
    },
    SlashCommand {
        id: "heading-2",
        label: "Heading 2",
        description: "Medium section heading",
        category: SlashCategory::Basic,
        keywords: &["h2", "heading", "subtitle"],
        action: block(ElementType::Heading, Some(2)),
    },
    SlashCommand {
        id: "heading-3",
        label: "Heading 3",
        description: "Small section heading",
        category: SlashCategory::Basic,
        keywords: &["h3", "heading"],
        action: block(ElementType::Heading, Some(3)),
    },
    SlashCommand {
        id: "blockquote",
        label: "Blockquote",
        description: "Quoted text block",
        category: SlashCategory::Basic,
        keywords: &["quote", "blockquote", "q"],
        action: block(ElementType::Blockquote, None),
    },
    SlashCommand {
        id: "code-block",
        label: "Code Block",
        description: "Preformatted code",
        category: SlashCategory::Basic,
        keywords: &["code", "codeblock", "pre", "snippet"],
        action: block(ElementType::CodeBlock, None),
    },
    SlashCommand {
        id: "bulleted-list",
        label: "Bulleted List",
        description: "Unordered list with bullets",
        category: SlashCategory::Lists,
        keywords: &["bullet", "ul", "unordered", "list"],
        action: block(ElementType::BulletedList, None),
    },
    SlashCommand {
        id: "numbered-list",
        label: "Numbered List",
        description: "Ordered list with numbers",
        category: SlashCategory::Lists,
        keywords: &["number", "ol", "ordered", "list"],
        action: block(ElementType::NumberedList, None),
    },
    SlashCommand {
        id: "table",
        label: "Table",
        description: "Grid of rows and columns",
        category: SlashCategory::Advanced,
        keywords: &["table", "grid", "rows", "columns", "cells"],
        action: SlashAction::InsertTable,
    },
    SlashCommand {
        id: "image",
        label: "Image",
        description: "Insert an image from a URL",
        category: SlashCategory::Media,
        keywords: &["image", "img", "photo", "picture"],
        action: SlashAction::PromptImage,
    },
    SlashCommand {
        id: "video",
        label: "Video",
        description: "Embed YouTube, Vimeo, or a video file",
        category: SlashCategory::Media,
        keywords: &["video", "youtube", "vimeo", "embed", "movie"],
        action: SlashAction::PromptVideo,
    },
    SlashCommand {
        id: "link",
        label: "Link",
        description: "Insert a hyperlink",
        category: SlashCategory::Media,
        keywords: &["link", "url", "href", "anchor"],
        action: SlashAction::PromptLink,
    },
    SlashCommand {
        id: "variable",
        label: "Variable",
        description: "Insert a template variable {{...}}",
        category: SlashCategory::Advanced,
        keywords: &["variable", "template", "merge", "tag", "placeholder"],
        action: SlashAction::PromptVariable,
    },
];

/// Entries whose label, description or a keyword contains `query`,
/// ignoring case, in catalogue order. A blank query matches everything.
pub fn filter_slash_commands(query: &str) -> Vec<&'static SlashCommand> {
    let needle = query.trim().to_lowercase();
    SLASH_COMMANDS
        .iter()
        .filter(|cmd| {
            needle.is_empty()
                || cmd.label.to_lowercase().contains(&needle)
                || cmd.description.to_lowercase().contains(&needle)
                || cmd.keywords.iter().any(|kw| kw.contains(needle.as_str()))
        })
        .collect()
}

pub fn slash_command(id: &str) -> Option<&'static SlashCommand> {
    SLASH_COMMANDS.iter().find(|cmd| cmd.id == id)
}

/// Runs an entry that needs no further input. Returns false for prompt
/// entries, which the caller completes with the matching insert command.
pub fn run_slash_command(editor: &mut Editor, command: &SlashCommand) -> Result<bool, ApplyError> {
    match command.action {
        SlashAction::Block { block, level } => {
            toggle_block(editor, block, level)?;
            Ok(true)
        }
        SlashAction::InsertTable => {
            insert_table(editor, DEFAULT_ROWS, DEFAULT_COLS)?;
            Ok(true)
        }
        SlashAction::PromptLink
        | SlashAction::PromptImage
        | SlashAction::PromptVideo
        | SlashAction::PromptVariable => Ok(false),
    }
}
