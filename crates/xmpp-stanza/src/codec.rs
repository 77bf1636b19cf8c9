//! Stanza codec for tokio.
//!
//! Frames one serialized stanza per line. The serializer never emits raw
//! line breaks, so a newline always terminates a stanza. Blank lines are
//! whitespace keepalives and are skipped.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

use crate::element::Element;
use crate::error::{Result, StanzaError};

/// Default maximum line length in bytes.
pub const DEFAULT_MAX_LINE: usize = 64 * 1024;

/// Tokio codec for encoding/decoding [`Element`] stanzas.
///
/// Wraps [`LinesCodec`] and parses each line into an [`Element`].
#[derive(Debug)]
pub struct StanzaCodec {
    inner: LinesCodec,
    max_len: usize,
}

impl StanzaCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE)
    }

    /// Create a codec with a custom line limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(max_len),
            max_len,
        }
    }

    fn map_err(&self, err: LinesCodecError) -> StanzaError {
        match err {
            LinesCodecError::MaxLineLengthExceeded => StanzaError::LineTooLong {
                limit: self.max_len,
            },
            LinesCodecError::Io(e) => StanzaError::Io(e),
        }
    }
}

impl Default for StanzaCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for StanzaCodec {
    type Item = Element;
    type Error = StanzaError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Element>> {
        loop {
            match self.inner.decode(src).map_err(|e| self.map_err(e))? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Element::parse(&line).map(Some),
                None => return Ok(None),
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Element>> {
        loop {
            match self.inner.decode_eof(src).map_err(|e| self.map_err(e))? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Element::parse(&line).map(Some),
                None => return Ok(None),
            }
        }
    }
}

impl Encoder<Element> for StanzaCodec {
    type Error = StanzaError;

    fn encode(&mut self, stanza: Element, dst: &mut BytesMut) -> Result<()> {
        let line = stanza.to_string();
        self.inner
            .encode(line.as_str(), dst)
            .map_err(|e| self.map_err(e))
    }
}
