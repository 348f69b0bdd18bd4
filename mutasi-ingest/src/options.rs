use serde::{Deserialize, Serialize};

/// Knobs for [`crate::StatementParser`]. Every field has a default so a
/// partial `[parser]` table in a config file is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Emit a `Parsing` progress event every N chunks (0 disables them)
    pub progress_every: usize,
    /// Parse chunks on the rayon pool; output order is unchanged
    pub parallel: bool,
    /// Extra case-insensitive substrings that mark a row as boilerplate
    pub extra_noise: Vec<String>,
    /// Overrides the `source_file` written on every transaction
    pub source_file: Option<String>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            progress_every: 50,
            parallel: false,
            extra_noise: Vec::new(),
            source_file: None,
        }
    }
}
