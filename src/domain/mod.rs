//! Domain layer: strong types with validation and invariants (no I/O).

mod codec;
mod message;
mod request;
mod response;
mod validation;
mod value;

pub use codec::{EncodedText, EucKr, TextCodec};
pub use message::{
    MAX_MESSAGE_BYTES, QueuedEntry, QueuedMessage, SliceStrategy, encode_text, slice_message,
};
pub use request::{
    CANCEL_DATE_OFFSET, Comment, DATE_FORMAT, MIN_SCHEDULE_LEAD, Schedule, SendOptions,
    cancel_date,
};
pub use response::{GatewayResponse, PhpKey, PhpValue, ResponseKey, ResponseValue};
pub use validation::ValidationError;
pub use value::{
    AdminUser, AuthKey, DEFAULT_PREFIX, PhoneNumber, ReservationId, SenderIp, SenderPhone,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_user_rejects_empty() {
        assert!(matches!(
            AdminUser::new("   "),
            Err(ValidationError::Empty {
                field: AdminUser::FIELD
            })
        ));
    }

    #[test]
    fn normalized_numbers_default_the_prefix() {
        assert_eq!(PhoneNumber::parse("1234-5678").unwrap().as_str(), "010-1234-5678");
        assert_eq!(
            PhoneNumber::parse("060-1234-5678").unwrap().as_str(),
            "060-1234-5678"
        );
        assert!(DEFAULT_PREFIX.starts_with('0'));
    }

    #[test]
    fn short_text_fits_in_one_segment() {
        let segments = slice_message("hello", &EucKr, SliceStrategy::Compatible).unwrap();
        assert_eq!(segments, vec![EncodedText::from_bytes(b"hello".to_vec())]);
    }

    #[test]
    fn slicing_keeps_each_segment_within_the_limit_for_korean_text() {
        let text = "가나다라마바사아자차카타파하".repeat(10);
        let segments = slice_message(&text, &EucKr, SliceStrategy::default()).unwrap();
        assert!(segments.len() >= 2);
        assert!(segments.iter().all(|s| s.len() <= MAX_MESSAGE_BYTES));
    }
}
