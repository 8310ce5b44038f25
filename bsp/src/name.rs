use crate::errors::{ErrorKind, Result};
use error_chain::{bail, ensure};
use std::fmt;
use std::fmt::{Debug, Display};
use std::ops::Deref;
use std::str::{self, FromStr};

/// Capacity of the `tname` field in a polygon record.
pub const MAX_TEXTURE_NAME_LEN: usize = 32;

/// Fixed-capacity, NUL-padded texture name used as a lookup key into an
/// external texture archive. Stored uppercased.
#[derive(Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct TextureName([u8; MAX_TEXTURE_NAME_LEN]);

impl TextureName {
    pub fn from_bytes(value: &[u8]) -> Result<TextureName> {
        let mut name = [0u8; MAX_TEXTURE_NAME_LEN];
        let mut nulled = false;
        for (dest, &src) in name.iter_mut().zip(value.iter()) {
            match validate_byte(src) {
                Some(0) => {
                    nulled = true;
                    break;
                }
                Some(byte) => *dest = byte,
                None => bail!(ErrorKind::invalid_byte_in_texture_name(src, value)),
            }
        }

        ensure!(
            nulled || value.len() <= MAX_TEXTURE_NAME_LEN,
            ErrorKind::texture_name_too_long(value)
        );
        Ok(TextureName(name))
    }

    /// Lenient variant: scrubs invalid bytes to `_` and truncates at capacity.
    /// The flag is `false` whenever the input needed fixing up.
    pub fn from_bytes_lossy(value: &[u8]) -> (TextureName, bool) {
        let mut name = [0u8; MAX_TEXTURE_NAME_LEN];
        let mut clean = value.len() <= MAX_TEXTURE_NAME_LEN;
        for (dest, &src) in name.iter_mut().zip(value.iter()) {
            match validate_byte(src) {
                Some(0) => break,
                Some(byte) => {
                    if byte != src {
                        clean = false;
                    }
                    *dest = byte;
                }
                None => {
                    clean = false;
                    *dest = b'_';
                }
            }
        }
        (TextureName(name), clean)
    }

    pub fn as_str(&self) -> &str {
        let end = self
            .0
            .iter()
            .position(|&byte| byte == 0)
            .unwrap_or(MAX_TEXTURE_NAME_LEN);
        str::from_utf8(&self.0[..end]).expect("texture name is not valid utf-8")
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }
}

/// Uppercases and checks a byte against the texture-name charset. Returns
/// `None` for bytes the format never produces.
fn validate_byte(byte: u8) -> Option<u8> {
    match byte.to_ascii_uppercase() {
        b @ b'A'..=b'Z'
        | b @ b'0'..=b'9'
        | b @ b'_'
        | b @ b'%'
        | b @ b'-'
        | b @ b'['
        | b @ b']'
        | b @ b'.'
        | b @ b'/'
        | b @ b'\\' => Some(b),
        b'\0' => Some(0),
        _ => None,
    }
}

impl Default for TextureName {
    fn default() -> TextureName {
        TextureName([0u8; MAX_TEXTURE_NAME_LEN])
    }
}

impl FromStr for TextureName {
    type Err = crate::errors::Error;
    fn from_str(value: &str) -> Result<TextureName> {
        TextureName::from_bytes(value.as_bytes())
    }
}

impl Display for TextureName {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{}", self.as_str())
    }
}

impl Debug for TextureName {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "TextureName({:?})", self.as_str())
    }
}

impl Deref for TextureName {
    type Target = [u8; MAX_TEXTURE_NAME_LEN];
    fn deref(&self) -> &[u8; MAX_TEXTURE_NAME_LEN] {
        &self.0
    }
}

impl AsRef<str> for TextureName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod test {
    use super::{TextureName, MAX_TEXTURE_NAME_LEN};
    use std::str::FromStr;

    #[test]
    fn test_texture_name() {
        assert_eq!(TextureName::from_str("").unwrap().as_str(), "");
        assert_eq!(TextureName::from_str("wall01").unwrap().as_str(), "WALL01");
        assert_eq!(TextureName::from_str("A-B_C.D").unwrap().as_str(), "A-B_C.D");
        assert_eq!(
            TextureName::from_bytes(b"TRIM\0garbage").unwrap().as_str(),
            "TRIM"
        );

        let at_capacity = "W".repeat(MAX_TEXTURE_NAME_LEN);
        assert_eq!(
            TextureName::from_str(&at_capacity).unwrap().as_str(),
            at_capacity
        );

        let over_capacity = "W".repeat(MAX_TEXTURE_NAME_LEN + 1);
        assert!(TextureName::from_str(&over_capacity).is_err());
        assert!(TextureName::from_bytes(b"BAD NAME").is_err());
        assert!(TextureName::from_bytes(b"BAD\xffNAME").is_err());
    }

    #[test]
    fn test_lossy_scrubs_and_truncates() {
        let (name, clean) = TextureName::from_bytes_lossy(b"WALL01");
        assert!(clean);
        assert_eq!(name.as_str(), "WALL01");

        let (name, clean) = TextureName::from_bytes_lossy(b"BAD NAME");
        assert!(!clean);
        assert_eq!(name.as_str(), "BAD_NAME");

        let over_capacity = "W".repeat(MAX_TEXTURE_NAME_LEN + 4);
        let (name, clean) = TextureName::from_bytes_lossy(over_capacity.as_bytes());
        assert!(!clean);
        assert_eq!(name.as_str().len(), MAX_TEXTURE_NAME_LEN);
    }

    #[test]
    fn test_default_is_empty() {
        assert!(TextureName::default().is_empty());
        assert_eq!(TextureName::default().as_str(), "");
    }
}
