use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::core::Editor;
use crate::error::{ApplyError, CommandError, QueryError, RegistryError};
use crate::ops::Op;
use crate::schema::{Document, ElementKind};

pub type CommandHandler =
    Arc<dyn Fn(&mut Editor, Option<Value>) -> Result<(), CommandError> + Send + Sync>;

pub type QueryHandler =
    Arc<dyn Fn(&Editor, Option<Value>) -> Result<Value, QueryError> + Send + Sync>;

#[derive(Clone)]
pub struct CommandSpec {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub args_example: Option<Value>,
    pub hidden: bool,
    pub handler: CommandHandler,
}

impl CommandSpec {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        handler: impl Fn(&mut Editor, Option<Value>) -> Result<(), CommandError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            keywords: Vec::new(),
            args_example: None,
            hidden: false,
            handler: Arc::new(handler),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn args_example(mut self, args_example: Value) -> Self {
        self.args_example = Some(args_example);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

#[derive(Clone)]
pub struct QuerySpec {
    pub id: String,
    pub handler: QueryHandler,
}

impl QuerySpec {
    pub fn new(
        id: impl Into<String>,
        handler: impl Fn(&Editor, Option<Value>) -> Result<Value, QueryError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            handler: Arc::new(handler),
        }
    }
}

/// A file carried by a paste or drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PastedFile {
    pub name: Option<String>,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Clipboard payload handed to [`Editor::insert_data`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasteData {
    pub text: Option<String>,
    pub files: Vec<PastedFile>,
}

impl PasteData {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            files: Vec::new(),
        }
    }

    pub fn files(files: Vec<PastedFile>) -> Self {
        Self { text: None, files }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intercept {
    Handled,
    Continue,
}

impl Intercept {
    pub fn is_handled(self) -> bool {
        self == Intercept::Handled
    }
}

pub trait NormalizePass: Send + Sync {
    fn id(&self) -> &'static str;
    fn run(&self, doc: &Document, registry: &PluginRegistry) -> Vec<Op>;
}

/// Capability extension point. Every hook defaults to "no opinion" or
/// "continue", so a plugin only overrides what it changes.
pub trait EditorPlugin: Send + Sync {
    fn id(&self) -> &'static str;

    fn is_inline(&self, _kind: &ElementKind) -> Option<bool> {
        None
    }

    fn is_void(&self, _kind: &ElementKind) -> Option<bool> {
        None
    }

    fn insert_text(&self, _editor: &mut Editor, _text: &str) -> Result<Intercept, ApplyError> {
        Ok(Intercept::Continue)
    }

    fn insert_data(&self, _editor: &mut Editor, _data: &PasteData) -> Result<Intercept, ApplyError> {
        Ok(Intercept::Continue)
    }

    fn normalize_passes(&self) -> Vec<Box<dyn NormalizePass>> {
        Vec::new()
    }

    fn commands(&self) -> Vec<CommandSpec> {
        Vec::new()
    }

    fn queries(&self) -> Vec<QuerySpec> {
        Vec::new()
    }
}

/// Plugins in registration order. Hooks are consulted from the most recently
/// registered plugin inward, so a later plugin sees input before the ones it
/// was layered on.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn EditorPlugin>>,
    normalize_passes: Vec<Box<dyn NormalizePass>>,
    commands: HashMap<String, CommandSpec>,
    queries: HashMap<String, QuerySpec>,
}

impl PluginRegistry {
    pub fn new(
        plugins: impl IntoIterator<Item = Box<dyn EditorPlugin>>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for plugin in plugins {
            registry.register_plugin(plugin)?;
        }
        Ok(registry)
    }

    /// Structural normalization only.
    pub fn core() -> Self {
        let plugins: Vec<Box<dyn EditorPlugin>> = vec![Box::new(crate::normalize::CorePlugin)];
        Self::new(plugins).expect("core registry must be valid")
    }

    pub fn richtext() -> Self {
        Self::new(richtext_plugins()).expect("richtext registry must be valid")
    }

    /// Rich-text plugins followed by caller plugins, which then see input
    /// first.
    pub fn richtext_with(
        extra: impl IntoIterator<Item = Box<dyn EditorPlugin>>,
    ) -> Result<Self, RegistryError> {
        let mut plugins = richtext_plugins();
        plugins.extend(extra);
        Self::new(plugins)
    }

    pub fn register_plugin(&mut self, plugin: Box<dyn EditorPlugin>) -> Result<(), RegistryError> {
        if self.plugins.iter().any(|p| p.id() == plugin.id()) {
            return Err(RegistryError::DuplicatePlugin(plugin.id().to_string()));
        }

        self.normalize_passes.extend(plugin.normalize_passes());

        for cmd in plugin.commands() {
            if self.commands.contains_key(&cmd.id) {
                return Err(RegistryError::DuplicateCommand(cmd.id));
            }
            self.commands.insert(cmd.id.clone(), cmd);
        }

        for query in plugin.queries() {
            if self.queries.contains_key(&query.id) {
                return Err(RegistryError::DuplicateQuery(query.id));
            }
            self.queries.insert(query.id.clone(), query);
        }

        self.plugins.push(Arc::from(plugin));
        Ok(())
    }

    pub fn plugins(&self) -> &[Arc<dyn EditorPlugin>] {
        &self.plugins
    }

    pub fn plugin_ids(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.id()).collect()
    }

    pub fn is_inline(&self, kind: &ElementKind) -> bool {
        self.plugins
            .iter()
            .rev()
            .find_map(|p| p.is_inline(kind))
            .unwrap_or(false)
    }

    pub fn is_void(&self, kind: &ElementKind) -> bool {
        self.plugins
            .iter()
            .rev()
            .find_map(|p| p.is_void(kind))
            .unwrap_or(false)
    }

    pub fn normalize_passes(&self) -> &[Box<dyn NormalizePass>] {
        &self.normalize_passes
    }

    pub fn commands(&self) -> &HashMap<String, CommandSpec> {
        &self.commands
    }

    pub fn command(&self, id: &str) -> Option<CommandSpec> {
        self.commands.get(id).cloned()
    }

    pub fn queries(&self) -> &HashMap<String, QuerySpec> {
        &self.queries
    }

    pub fn query(&self, id: &str) -> Option<QuerySpec> {
        self.queries.get(id).cloned()
    }

    /// Ops from the first pass that finds work. Each pass computes its ops
    /// against `doc` as given, so passes never see each other's stale paths.
    pub fn normalize(&self, doc: &Document) -> Vec<Op> {
        for pass in &self.normalize_passes {
            let ops = pass.run(doc, self);
            if !ops.is_empty() {
                tracing::trace!(pass = pass.id(), ops = ops.len(), "normalize");
                return ops;
            }
        }
        Vec::new()
    }
}

fn richtext_plugins() -> Vec<Box<dyn EditorPlugin>> {
    vec![
        Box::new(crate::normalize::CorePlugin),
        Box::new(crate::inlines::InlinesPlugin),
        Box::new(crate::images::ImagesPlugin),
        Box::new(crate::links::LinksPlugin),
        Box::new(crate::variables::VariablesPlugin),
        Box::new(crate::shortcuts::ShortcutsPlugin),
        Box::new(crate::marks::MarksPlugin),
        Box::new(crate::blocks::BlocksPlugin),
        Box::new(crate::lists::ListsPlugin),
        Box::new(crate::table::TablePlugin),
        Box::new(crate::video::VideoPlugin),
    ]
}

pub(crate) fn arg_str<'a>(args: Option<&'a Value>, key: &str) -> Option<&'a str> {
    args?.get(key)?.as_str()
}

pub(crate) fn arg_u64(args: Option<&Value>, key: &str) -> Option<u64> {
    args?.get(key)?.as_u64()
}

pub(crate) fn require_str(args: Option<&Value>, key: &str) -> Result<String, CommandError> {
    arg_str(args, key)
        .map(str::to_string)
        .ok_or_else(|| CommandError::new(format!("Missing string argument `{key}`")))
}

/// Maps an editing result onto the command surface. `false` from a
/// boundary-condition no-op is still a successful command.
pub(crate) fn command_result<T>(
    action: &str,
    result: Result<T, ApplyError>,
) -> Result<(), CommandError> {
    result
        .map(|_| ())
        .map_err(|err| CommandError::new(format!("Failed to {action}: {err}")))
}
