use crate::errors::{ErrorKind, Result, ResultExt};
use crate::tokenizer::OverflowRule;
use serde_derive::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Compatibility switches for the loose parts of the grammar. The defaults
/// reproduce the original parser's tolerances while keeping every one of
/// them observable through diagnostics.
#[derive(Copy, Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormatProfile {
    /// Malformed numeric tokens parse as zero (with a diagnostic) instead of
    /// failing the read.
    pub lenient_numbers: bool,

    /// Handling of tokens longer than the 128-byte capacity.
    pub long_tokens: OverflowRule,

    /// Accept the `polygon` keyword at file scope, outside any node body.
    pub top_level_polygons: bool,

    /// Upper bound on `node` keyword nesting within one descent. Every
    /// `node` record after the first nests inside it, so this bounds the
    /// node count of a readable file, not just tree height; the default
    /// therefore matches the declared-count ceiling, so any node count the
    /// reader would allocate for can also be read back.
    pub max_node_depth: usize,
}

impl Default for FormatProfile {
    fn default() -> FormatProfile {
        FormatProfile {
            lenient_numbers: true,
            long_tokens: OverflowRule::Truncate,
            top_level_polygons: true,
            max_node_depth: 1 << 20,
        }
    }
}

impl FormatProfile {
    /// The spec-recommended strict variant: every inherited tolerance is an
    /// error instead.
    pub fn strict() -> FormatProfile {
        FormatProfile {
            lenient_numbers: false,
            long_tokens: OverflowRule::Reject,
            ..FormatProfile::default()
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: &P) -> Result<FormatProfile> {
        let mut contents = String::new();
        let path = path.as_ref();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .chain_err(ErrorKind::on_profile_read)?;
        FormatProfile::from_text(&contents)
    }

    pub fn from_text(text: &str) -> Result<FormatProfile> {
        toml::from_str(text).chain_err(ErrorKind::on_profile_parse)
    }
}
