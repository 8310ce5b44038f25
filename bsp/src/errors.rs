use error_chain::error_chain;
use std::path::Path;

error_chain! {
    errors {
        CorruptBsp(message: String) {
            description("Corrupt BSP file.")
            display("Corrupt BSP file: {}", message)
        }
        CorruptProfile(message: String) {
            description("Corrupt format profile.")
            display("Corrupt format profile: {}", message)
        }
        Io(message: String) {
            description("I/O BSP error.")
            display("I/O BSP error: {}", message)
        }
    }
}

impl ErrorKind {
    pub fn on_file_open(path: &Path) -> ErrorKind {
        ErrorKind::Io(format!("Failed to open `{}`.", path.display()))
    }

    pub fn on_file_create(path: &Path) -> ErrorKind {
        ErrorKind::Io(format!("Failed to create `{}`.", path.display()))
    }

    pub fn on_stream_read() -> ErrorKind {
        ErrorKind::Io("Failed reading from level stream.".to_owned())
    }

    pub fn on_stream_write() -> ErrorKind {
        ErrorKind::Io("Failed writing to level stream.".to_owned())
    }

    pub fn on_profile_read() -> ErrorKind {
        ErrorKind::Io("Failed to load format profile to memory.".to_owned())
    }

    pub fn on_profile_parse() -> ErrorKind {
        ErrorKind::CorruptProfile("Failed to parse format profile.".to_owned())
    }

    pub fn token_too_long(prefix: &str) -> ErrorKind {
        ErrorKind::CorruptBsp(format!("Token exceeds capacity: `{}...`", prefix))
    }

    pub fn bad_number(what: &'static str, token: &str) -> ErrorKind {
        ErrorKind::CorruptBsp(format!("Invalid number for {}: `{}`", what, token))
    }

    pub fn unexpected_eof(what: &'static str) -> ErrorKind {
        ErrorKind::CorruptBsp(format!("Unexpected end of stream while reading {}", what))
    }

    pub fn bad_count(keyword: &'static str, value: i32) -> ErrorKind {
        ErrorKind::CorruptBsp(format!("Invalid count for `{}`: {}", keyword, value))
    }

    pub fn slot_out_of_bounds(kind: &'static str, index: i32, declared: usize) -> ErrorKind {
        ErrorKind::CorruptBsp(format!(
            "{} index {} out of bounds (declared {})",
            kind, index, declared
        ))
    }

    pub fn too_many_polygon_verts(polygon: usize, limit: usize) -> ErrorKind {
        ErrorKind::CorruptBsp(format!(
            "Polygon {} exceeds {} vertex indices",
            polygon, limit
        ))
    }

    pub fn node_cycle(index: usize) -> ErrorKind {
        ErrorKind::CorruptBsp(format!("Node {} revisited within one descent", index))
    }

    pub fn node_too_deep(depth: usize) -> ErrorKind {
        ErrorKind::CorruptBsp(format!("Node nesting exceeds depth limit {}", depth))
    }

    pub fn invalid_byte_in_texture_name(byte: u8, bytes: &[u8]) -> ErrorKind {
        ErrorKind::CorruptBsp(format!(
            "Invalid character `{}` in texture name `{}`.",
            char::from(byte),
            String::from_utf8_lossy(bytes),
        ))
    }

    pub fn texture_name_too_long(bytes: &[u8]) -> ErrorKind {
        ErrorKind::CorruptBsp(format!(
            "Texture name too long `{}`.",
            String::from_utf8_lossy(bytes)
        ))
    }
}
