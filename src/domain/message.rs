use crate::domain::codec::{EncodedText, TextCodec};
use crate::domain::validation::ValidationError;
use crate::domain::value::PhoneNumber;

/// Largest message body, in encoded bytes, the gateway accepts per SMS.
pub const MAX_MESSAGE_BYTES: usize = 90;

/// The compatible slicer only measures the accumulation once it holds more
/// characters than this.
const COMPATIBLE_MIN_CHARS: usize = 44;

/// Encoded lengths at which the compatible slicer closes a segment.
const COMPATIBLE_CLOSE_AT: [usize; 2] = [MAX_MESSAGE_BYTES - 1, MAX_MESSAGE_BYTES];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// How oversized messages are split into segments.
pub enum SliceStrategy {
    /// Grow each segment one character at a time and close it when, past 44
    /// characters, its encoded length is exactly 89 or 90 bytes. Matches the
    /// segment accounting the gateway has historically seen.
    #[default]
    Compatible,
    /// Pack as many whole characters as fit into 90 encoded bytes.
    Greedy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One queued SMS: canonical recipient plus encoded body.
pub struct QueuedEntry {
    recipient: PhoneNumber,
    body: EncodedText,
}

impl QueuedEntry {
    /// Form field name of the message body (`sms`).
    pub const BODY_FIELD: &'static str = "sms";

    pub(crate) fn new(recipient: PhoneNumber, body: EncodedText) -> Self {
        Self { recipient, body }
    }

    pub fn recipient(&self) -> &PhoneNumber {
        &self.recipient
    }

    pub fn body(&self) -> &EncodedText {
        &self.body
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A queued SMS with its body decoded back to text.
pub struct QueuedMessage {
    pub recipient: PhoneNumber,
    pub text: String,
}

/// Encode `text` for the form field `field`, failing on unmappable characters.
pub fn encode_text(
    codec: &dyn TextCodec,
    field: &'static str,
    text: &str,
) -> Result<EncodedText, ValidationError> {
    codec
        .encode(text)
        .map(EncodedText::from_bytes)
        .ok_or(ValidationError::Unencodable {
            field,
            codec: codec.name(),
        })
}

/// Split `text` into encoded segments without breaking characters apart.
///
/// Decoding the segments in order and concatenating them yields `text`.
pub fn slice_message(
    text: &str,
    codec: &dyn TextCodec,
    strategy: SliceStrategy,
) -> Result<Vec<EncodedText>, ValidationError> {
    match strategy {
        SliceStrategy::Compatible => slice_compatible(text, codec),
        SliceStrategy::Greedy => slice_greedy(text, codec),
    }
}

fn slice_compatible(
    text: &str,
    codec: &dyn TextCodec,
) -> Result<Vec<EncodedText>, ValidationError> {
    let mut segments = Vec::new();
    let mut pending = String::new();
    let mut pending_chars = 0usize;

    for ch in text.chars() {
        pending.push(ch);
        pending_chars += 1;

        if pending_chars > COMPATIBLE_MIN_CHARS {
            let encoded = encode_text(codec, QueuedEntry::BODY_FIELD, &pending)?;
            if COMPATIBLE_CLOSE_AT.contains(&encoded.len()) {
                segments.push(encoded);
                pending.clear();
                pending_chars = 0;
            }
        }
    }

    if !pending.is_empty() {
        segments.push(encode_text(codec, QueuedEntry::BODY_FIELD, &pending)?);
    }

    Ok(segments)
}

fn slice_greedy(text: &str, codec: &dyn TextCodec) -> Result<Vec<EncodedText>, ValidationError> {
    let mut segments = Vec::new();
    let mut pending = Vec::<u8>::new();
    let mut buf = [0u8; 4];

    for ch in text.chars() {
        let encoded = encode_text(codec, QueuedEntry::BODY_FIELD, ch.encode_utf8(&mut buf))?;
        if !pending.is_empty() && pending.len() + encoded.len() > MAX_MESSAGE_BYTES {
            segments.push(EncodedText::from_bytes(std::mem::take(&mut pending)));
        }
        pending.extend_from_slice(encoded.as_bytes());
    }

    if !pending.is_empty() {
        segments.push(EncodedText::from_bytes(pending));
    }

    Ok(segments)
}
