mod errors;
mod level;
mod meta;
mod name;
mod reader;
mod tokenizer;
mod writer;

pub mod types;
pub mod util;

pub use crate::errors::{Error, ErrorKind, Result};
pub use crate::level::Level;
pub use crate::meta::FormatProfile;
pub use crate::name::{TextureName, MAX_TEXTURE_NAME_LEN};
pub use crate::reader::{Diagnostic, LevelReader, LoadedLevel};
pub use crate::tokenizer::{OverflowRule, Token, Tokenizer, MAX_TOKEN_LEN};
pub use crate::writer::{save_level, write_level};
