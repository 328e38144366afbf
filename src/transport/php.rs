
use crate::domain::{GatewayResponse, PhpKey, PhpValue, ResponseKey, ResponseValue};

const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed PHP serialized data at byte {offset}: {kind}")]
/// The gateway response is not well-formed PHP `serialize()` output.
pub struct DecodeError {
    offset: usize,
    kind: DecodeErrorKind,
}

impl DecodeError {
    fn new(offset: usize, kind: DecodeErrorKind) -> Self {
        Self { offset, kind }
    }

    /// Byte offset into the response body where decoding stopped.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("expected `{expected}`, found byte 0x{found:02x}")]
    Expected { expected: char, found: u8 },
    #[error("unknown type tag 0x{0:02x}")]
    UnknownTag(u8),
    #[error("invalid boolean")]
    InvalidBool,
    #[error("invalid integer")]
    InvalidInt,
    #[error("invalid float")]
    InvalidFloat,
    #[error("invalid length")]
    InvalidLength,
    #[error("array keys must be integers or strings")]
    InvalidKey,
    #[error("arrays nested too deeply")]
    TooDeep,
    #[error("top-level value is not an array")]
    NotAMapping,
    #[error("trailing data after value")]
    TrailingData,
}

/// Parse one PHP-serialized value. Surrounding ASCII whitespace is ignored.
pub fn unserialize(input: &[u8]) -> Result<PhpValue, DecodeError> {
    let mut parser = Parser::new(input);
    parser.skip_whitespace();
    let value = parser.value()?;
    parser.skip_whitespace();
    if parser.pos != input.len() {
        return Err(DecodeError::new(parser.pos, DecodeErrorKind::TrailingData));
    }
    Ok(value)
}

/// Decode a gateway response body into a [`GatewayResponse`].
///
/// Top-level keys and values that are UTF-8 byte strings become text; every
/// other key or value is kept as parsed.
pub fn decode_response(input: &[u8]) -> Result<GatewayResponse, DecodeError> {
    let PhpValue::Array(items) = unserialize(input)? else {
        return Err(DecodeError::new(0, DecodeErrorKind::NotAMapping));
    };

    Ok(GatewayResponse::from_entries(items.into_iter().map(
        |(key, value)| (response_key(key), response_value(value)),
    )))
}

fn response_key(key: PhpKey) -> ResponseKey {
    match key {
        PhpKey::Int(value) => ResponseKey::Int(value),
        PhpKey::Str(bytes) => match String::from_utf8(bytes) {
            Ok(text) => ResponseKey::Text(text),
            Err(err) => ResponseKey::Bytes(err.into_bytes()),
        },
    }
}

fn response_value(value: PhpValue) -> ResponseValue {
    match value {
        PhpValue::Str(bytes) => match String::from_utf8(bytes) {
            Ok(text) => ResponseValue::Text(text),
            Err(err) => ResponseValue::Raw(PhpValue::Str(err.into_bytes())),
        },
        other => ResponseValue::Raw(other),
    }
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn error(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::new(self.pos, kind)
    }

    fn skip_whitespace(&mut self) {
        while self
            .input
            .get(self.pos)
            .is_some_and(|byte| byte.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }

    fn next_byte(&mut self) -> Result<u8, DecodeError> {
        let byte = *self
            .input
            .get(self.pos)
            .ok_or_else(|| self.error(DecodeErrorKind::UnexpectedEof))?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect(&mut self, expected: u8) -> Result<(), DecodeError> {
        let start = self.pos;
        let found = self.next_byte()?;
        if found != expected {
            return Err(DecodeError::new(
                start,
                DecodeErrorKind::Expected {
                    expected: char::from(expected),
                    found,
                },
            ));
        }
        Ok(())
    }

    /// Take everything up to `delimiter` and step past it.
    fn take_until(&mut self, delimiter: u8) -> Result<&'a [u8], DecodeError> {
        let rest = &self.input[self.pos..];
        let len = rest
            .iter()
            .position(|&byte| byte == delimiter)
            .ok_or_else(|| DecodeError::new(self.input.len(), DecodeErrorKind::UnexpectedEof))?;
        self.pos += len + 1;
        Ok(&rest[..len])
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.input.len())
            .ok_or_else(|| DecodeError::new(self.input.len(), DecodeErrorKind::UnexpectedEof))?;
        let bytes = &self.input[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn number<T: std::str::FromStr>(
        &mut self,
        delimiter: u8,
        kind: DecodeErrorKind,
    ) -> Result<T, DecodeError> {
        let start = self.pos;
        let raw = self.take_until(delimiter)?;
        std::str::from_utf8(raw)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or(DecodeError::new(start, kind))
    }

    fn value(&mut self) -> Result<PhpValue, DecodeError> {
        let start = self.pos;
        match self.next_byte()? {
            b'N' => {
                self.expect(b';')?;
                Ok(PhpValue::Null)
            }
            b'b' => {
                self.expect(b':')?;
                let flag_start = self.pos;
                match self.take_until(b';')? {
                    b"0" => Ok(PhpValue::Bool(false)),
                    b"1" => Ok(PhpValue::Bool(true)),
                    _ => Err(DecodeError::new(flag_start, DecodeErrorKind::InvalidBool)),
                }
            }
            b'i' => {
                self.expect(b':')?;
                Ok(PhpValue::Int(
                    self.number(b';', DecodeErrorKind::InvalidInt)?,
                ))
            }
            b'd' => {
                self.expect(b':')?;
                self.float()
            }
            b's' => {
                self.expect(b':')?;
                let len: usize = self.number(b':', DecodeErrorKind::InvalidLength)?;
                self.expect(b'"')?;
                let bytes = self.take(len)?.to_vec();
                self.expect(b'"')?;
                self.expect(b';')?;
                Ok(PhpValue::Str(bytes))
            }
            b'a' => {
                self.expect(b':')?;
                let count: usize = self.number(b':', DecodeErrorKind::InvalidLength)?;
                self.expect(b'{')?;
                self.array(count)
            }
            tag => Err(DecodeError::new(start, DecodeErrorKind::UnknownTag(tag))),
        }
    }

    fn float(&mut self) -> Result<PhpValue, DecodeError> {
        let start = self.pos;
        let value = match self.take_until(b';')? {
            b"INF" => f64::INFINITY,
            b"-INF" => f64::NEG_INFINITY,
            b"NAN" => f64::NAN,
            raw => std::str::from_utf8(raw)
                .ok()
                .and_then(|text| text.parse::<f64>().ok())
                .ok_or(DecodeError::new(start, DecodeErrorKind::InvalidFloat))?,
        };
        Ok(PhpValue::Float(value))
    }

    fn array(&mut self, count: usize) -> Result<PhpValue, DecodeError> {
        if self.depth == MAX_DEPTH {
            return Err(self.error(DecodeErrorKind::TooDeep));
        }
        self.depth += 1;

        // `count` comes from the wire; don't trust it for allocation.
        let mut items = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            let key = self.key()?;
            let value = self.value()?;
            items.push((key, value));
        }
        self.expect(b'}')?;

        self.depth -= 1;
        Ok(PhpValue::Array(items))
    }

    fn key(&mut self) -> Result<PhpKey, DecodeError> {
        let start = self.pos;
        match self.value()? {
            PhpValue::Int(value) => Ok(PhpKey::Int(value)),
            PhpValue::Str(bytes) => Ok(PhpKey::Str(bytes)),
            _ => Err(DecodeError::new(start, DecodeErrorKind::InvalidKey)),
        }
    }
}
