use std::fmt;

/// Text encoding used for every textual payload field sent to the gateway.
///
/// The gateway only understands a fixed legacy encoding, so message bodies and
/// comments are converted to bytes before they are queued or sent.
pub trait TextCodec: fmt::Debug + Send + Sync {
    /// Human-readable encoding label, used in error messages.
    fn name(&self) -> &'static str;

    /// Encode `text`, or return `None` if any character has no mapping.
    fn encode(&self, text: &str) -> Option<Vec<u8>>;

    /// Decode bytes produced by [`TextCodec::encode`]. Malformed sequences are
    /// replaced with U+FFFD.
    fn decode(&self, bytes: &[u8]) -> String;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// EUC-KR codec backed by `encoding_rs`. Hangul syllables and hanja take two
/// bytes, ASCII takes one.
pub struct EucKr;

impl TextCodec for EucKr {
    fn name(&self) -> &'static str {
        encoding_rs::EUC_KR.name()
    }

    fn encode(&self, text: &str) -> Option<Vec<u8>> {
        let (bytes, _, had_errors) = encoding_rs::EUC_KR.encode(text);
        if had_errors {
            return None;
        }
        Some(bytes.into_owned())
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let (text, _) = encoding_rs::EUC_KR.decode_without_bom_handling(bytes);
        text.into_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Bytes of a message body or comment in the gateway encoding.
pub struct EncodedText(Vec<u8>);

impl EncodedText {
    /// Wrap bytes that are already in the gateway encoding.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euc_kr_uses_one_byte_for_ascii_and_two_for_hangul() {
        assert_eq!(EucKr.encode("hello").unwrap(), b"hello".to_vec());
        assert_eq!(EucKr.encode("안녕").unwrap(), vec![0xBE, 0xC8, 0xB3, 0xE7]);
    }

    #[test]
    fn euc_kr_decodes_what_it_encodes() {
        let text = "예약 문자 test 123";
        let bytes = EucKr.encode(text).unwrap();
        assert_eq!(EucKr.decode(&bytes), text);
    }

    #[test]
    fn euc_kr_rejects_unmappable_characters() {
        assert_eq!(EucKr.encode("smile 🙂"), None);
    }

    #[test]
    fn euc_kr_name_is_the_whatwg_label() {
        assert_eq!(EucKr.name(), "EUC-KR");
    }
}
