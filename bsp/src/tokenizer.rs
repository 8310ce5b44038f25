use crate::errors::{Error, ErrorKind, Result};
use error_chain::bail;
use serde_derive::Deserialize;
use std::io::{Bytes, Read};

/// Token capacity inherited from the format's original 128-byte buffers.
pub const MAX_TOKEN_LEN: usize = 128;

/// What to do with a token longer than `MAX_TOKEN_LEN`.
#[derive(Copy, Clone, Debug, Deserialize, Eq, PartialEq)]
pub enum OverflowRule {
    /// Keep the first `MAX_TOKEN_LEN` bytes and flag the token (original behavior).
    Truncate,
    /// Fail the read.
    Reject,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    text: String,
    truncated: bool,
}

impl Token {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is(&self, literal: &str) -> bool {
        self.text == literal
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Splits a byte stream into whitespace-delimited tokens of bounded length.
pub struct Tokenizer<R: Read> {
    input: Bytes<R>,
    long_tokens: OverflowRule,
}

impl<R: Read> Tokenizer<R> {
    pub fn new(input: R, long_tokens: OverflowRule) -> Tokenizer<R> {
        Tokenizer {
            input: input.bytes(),
            long_tokens,
        }
    }

    /// Reads the next token, or `None` once the stream is exhausted.
    ///
    /// The capacity is counted in input bytes, so it holds regardless of
    /// what the bytes decode to; non-UTF-8 bytes are replaced in the token
    /// text and poison whatever tries to interpret it downstream.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        let mut bytes = Vec::new();
        let mut truncated = false;
        while let Some(byte) = self.next_byte()? {
            if byte.is_ascii_whitespace() {
                if bytes.is_empty() {
                    continue;
                }
                break;
            }
            if bytes.len() == MAX_TOKEN_LEN {
                match self.long_tokens {
                    OverflowRule::Reject => {
                        bail!(ErrorKind::token_too_long(&String::from_utf8_lossy(&bytes)))
                    }
                    OverflowRule::Truncate => {
                        truncated = true;
                        self.skip_to_whitespace()?;
                        break;
                    }
                }
            }
            bytes.push(byte);
        }
        Ok(if bytes.is_empty() {
            None
        } else {
            Some(Token {
                text: String::from_utf8_lossy(&bytes).into_owned(),
                truncated,
            })
        })
    }

    fn skip_to_whitespace(&mut self) -> Result<()> {
        while let Some(byte) = self.next_byte()? {
            if byte.is_ascii_whitespace() {
                break;
            }
        }
        Ok(())
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        match self.input.next() {
            Some(Ok(byte)) => Ok(Some(byte)),
            Some(Err(error)) => Err(Error::with_chain(error, ErrorKind::on_stream_read())),
            None => Ok(None),
        }
    }
}
