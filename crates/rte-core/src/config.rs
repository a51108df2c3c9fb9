use serde::{Deserialize, Serialize};

const DEFAULT_MAX_UNDO: usize = 200;
const DEFAULT_MAX_NORMALIZE_ITERATIONS: usize = 100;

fn default_max_undo() -> usize {
    DEFAULT_MAX_UNDO
}

fn default_max_normalize_iterations() -> usize {
    DEFAULT_MAX_NORMALIZE_ITERATIONS
}

/// Session limits. Zero values fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default = "default_max_undo")]
    pub max_undo: usize,
    #[serde(default = "default_max_normalize_iterations")]
    pub max_normalize_iterations: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO,
            max_normalize_iterations: DEFAULT_MAX_NORMALIZE_ITERATIONS,
        }
    }
}

impl EditorConfig {
    pub(crate) fn with_defaults(mut self) -> Self {
        if self.max_undo == 0 {
            self.max_undo = DEFAULT_MAX_UNDO;
        }
        if self.max_normalize_iterations == 0 {
            self.max_normalize_iterations = DEFAULT_MAX_NORMALIZE_ITERATIONS;
        }
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(s).map(Self::with_defaults)
    }
}
