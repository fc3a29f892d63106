use std::{collections::HashMap, io::Read};

use bstr::ByteSlice;
use tracing::trace;

use crate::{
    cursor::{ByteCursor, DEFAULT_BUFFER_SIZE},
    error::TorrentParserError,
    value::BencodeValue,
};

const INFO_KEY: &[u8] = b"info";

/// Hard cap on nesting, whatever [`DecoderOptions::max_depth`] asks for.
/// Decoding recurses once per level, so this bounds stack use.
pub const MAX_NESTING_LIMIT: usize = 512;

/// What to do when a dictionary repeats a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateKeyPolicy {
    /// The later value replaces the earlier one.
    #[default]
    LastWins,
    /// The decode fails with [`TorrentParserError::DuplicateKey`].
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    pub buffer_size: usize,
    pub duplicate_keys: DuplicateKeyPolicy,
    /// Maximum list/dictionary nesting before the input is rejected.
    /// Values above [`MAX_NESTING_LIMIT`] are clamped to it.
    pub max_depth: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            buffer_size: DEFAULT_BUFFER_SIZE,
            duplicate_keys: DuplicateKeyPolicy::default(),
            max_depth: 256,
        }
    }
}

/// Recursive-descent bencode decoder over a refillable [`ByteCursor`].
///
/// While decoding the root dictionary the decoder captures the literal bytes
/// of the dictionary stored under the `info` key, so the info-hash can be
/// computed without re-encoding anything.
pub struct BencodeDecoder<R> {
    cursor: ByteCursor<R>,
    options: DecoderOptions,
    depth: usize,
    capture_depth: Option<usize>,
    info_bytes: Option<Vec<u8>>,
}

impl<R: Read> BencodeDecoder<R> {
    pub fn new(source: R) -> Self {
        Self::with_options(source, DecoderOptions::default())
    }

    pub fn with_options(source: R, options: DecoderOptions) -> Self {
        BencodeDecoder {
            cursor: ByteCursor::with_capacity(options.buffer_size, source),
            options,
            depth: 0,
            capture_depth: None,
            info_bytes: None,
        }
    }

    /// Decodes the next complete value. Bytes after it are left unread.
    pub fn decode(&mut self) -> Result<BencodeValue, TorrentParserError> {
        self.depth = 0;
        self.capture_depth = None;
        self.info_bytes = None;
        self.cursor.finish_capture();
        self.decode_value()
    }

    /// Literal encoding of the root dictionary's `info` value from the last decode.
    pub fn info_bytes(&self) -> Option<&[u8]> {
        self.info_bytes.as_deref()
    }

    pub fn consumed(&self) -> u64 {
        self.cursor.consumed()
    }

    fn decode_value(&mut self) -> Result<BencodeValue, TorrentParserError> {
        match self.cursor.peek()? {
            b'i' => Ok(BencodeValue::Integer(self.decode_integer()?)),
            b'0'..=b'9' => Ok(BencodeValue::ByteString(self.decode_byte_string()?)),
            b'l' => self.decode_list(),
            b'd' => self.decode_dict(),
            other => Err(TorrentParserError::UnknownSpecifier(other)),
        }
    }

    fn decode_integer(&mut self) -> Result<i64, TorrentParserError> {
        self.cursor.consume()?;

        let negative = self.cursor.peek()? == b'-';
        if negative {
            self.cursor.consume()?;
        }

        // accumulate towards the sign so i64::MIN is representable
        let mut value: i64 = 0;
        let mut digits = 0usize;
        let mut leading_zero = false;
        loop {
            match self.cursor.consume()? {
                b'e' => break,
                c @ b'0'..=b'9' => {
                    if leading_zero {
                        return Err(TorrentParserError::InvalidInteger(
                            "leading zero".to_string(),
                        ));
                    }
                    if digits == 0 && c == b'0' {
                        leading_zero = true;
                    }
                    let digit = i64::from(c - b'0');
                    value = value
                        .checked_mul(10)
                        .and_then(|v| {
                            if negative {
                                v.checked_sub(digit)
                            } else {
                                v.checked_add(digit)
                            }
                        })
                        .ok_or(TorrentParserError::IntegerOverflow)?;
                    digits += 1;
                }
                other => {
                    return Err(TorrentParserError::InvalidInteger(format!(
                        "unexpected byte {:?}",
                        char::from(other)
                    )))
                }
            }
        }

        if digits == 0 {
            return Err(TorrentParserError::InvalidInteger("no digits".to_string()));
        }
        if negative && value == 0 {
            return Err(TorrentParserError::InvalidInteger(
                "negative zero".to_string(),
            ));
        }
        Ok(value)
    }

    fn decode_byte_string(&mut self) -> Result<Vec<u8>, TorrentParserError> {
        let mut length: usize = 0;
        loop {
            match self.cursor.consume()? {
                c @ b'0'..=b'9' => {
                    length = length
                        .checked_mul(10)
                        .and_then(|l| l.checked_add(usize::from(c - b'0')))
                        .ok_or(TorrentParserError::IntegerOverflow)?;
                }
                b':' => break,
                other => {
                    return Err(TorrentParserError::InvalidStructure(format!(
                        "expected colon after string length, found {:?}",
                        char::from(other)
                    )))
                }
            }
        }
        self.cursor.take(length)
    }

    fn decode_list(&mut self) -> Result<BencodeValue, TorrentParserError> {
        self.open()?;
        let mut list = Vec::new();
        while self.cursor.peek()? != b'e' {
            list.push(self.decode_value()?);
        }
        self.close()?;
        Ok(BencodeValue::List(list))
    }

    fn decode_dict(&mut self) -> Result<BencodeValue, TorrentParserError> {
        self.open()?;
        let is_root = self.depth == 1;
        let mut dict = HashMap::new();
        while self.cursor.peek()? != b'e' {
            let key = match self.decode_value()? {
                BencodeValue::ByteString(key) => key,
                other => {
                    return Err(TorrentParserError::FieldTypeError {
                        expected: "String".to_string(),
                        found: other.type_name().to_string(),
                    })
                }
            };

            if self.options.duplicate_keys == DuplicateKeyPolicy::Reject
                && dict.contains_key(&key)
            {
                return Err(TorrentParserError::DuplicateKey(
                    key.as_bstr().to_string(),
                ));
            }

            if is_root && key == INFO_KEY {
                self.info_bytes = None;
                if self.cursor.peek()? == b'd' {
                    trace!(offset = self.cursor.consumed(), "capturing info dictionary");
                    self.cursor.start_capture();
                    self.capture_depth = Some(self.depth);
                }
            }

            let value = self.decode_value()?;
            dict.insert(key, value);
        }
        self.close()?;
        Ok(BencodeValue::Dictionary(dict))
    }

    fn open(&mut self) -> Result<(), TorrentParserError> {
        let limit = self.options.max_depth.min(MAX_NESTING_LIMIT);
        if self.depth >= limit {
            return Err(TorrentParserError::InvalidStructure(format!(
                "nesting deeper than {}",
                limit
            )));
        }
        self.cursor.consume()?;
        self.depth += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), TorrentParserError> {
        self.cursor.consume()?;
        self.depth -= 1;
        if self.capture_depth == Some(self.depth) {
            self.capture_depth = None;
            self.info_bytes = self.cursor.finish_capture();
            trace!(
                len = self.info_bytes.as_ref().map_or(0, Vec::len),
                "captured info dictionary"
            );
        }
        Ok(())
    }
}

/// Decodes a single value from an in-memory buffer.
pub fn decode(bencoded: &[u8]) -> Result<BencodeValue, TorrentParserError> {
    BencodeDecoder::new(bencoded).decode()
}
