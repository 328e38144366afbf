use url::form_urlencoded::byte_serialize;

use crate::domain::{
    Comment, EncodedText, PhoneNumber, QueuedEntry, ReservationId, Schedule, SenderIp,
    SenderPhone,
};

/// Form fields in request order. Values are raw bytes because textual fields
/// travel in the gateway's legacy encoding, not UTF-8.
pub type FormParams = Vec<(&'static str, Vec<u8>)>;

pub fn encode_view_form() -> FormParams {
    vec![("type", b"view".to_vec())]
}

pub fn encode_cancel_form(reservation: ReservationId, date: &str) -> FormParams {
    vec![
        (Schedule::FIELD, date.as_bytes().to_vec()),
        (ReservationId::FIELD, reservation.value().to_string().into_bytes()),
    ]
}

pub fn encode_send_form(
    sender_phone: &SenderPhone,
    sender_ip: &SenderIp,
    entry: &QueuedEntry,
    schedule: &Schedule,
    comment: &EncodedText,
) -> FormParams {
    vec![
        (SenderPhone::FIELD, sender_phone.as_str().as_bytes().to_vec()),
        (PhoneNumber::FIELD, entry.recipient().as_str().as_bytes().to_vec()),
        (QueuedEntry::BODY_FIELD, entry.body().as_bytes().to_vec()),
        (Schedule::FIELD, schedule.as_str().as_bytes().to_vec()),
        (Comment::FIELD, comment.as_bytes().to_vec()),
        (SenderIp::FIELD, sender_ip.as_str().as_bytes().to_vec()),
    ]
}

/// Serialize `params` as an `application/x-www-form-urlencoded` body,
/// percent-encoding values byte for byte.
pub fn encode_form_body(params: &[(&'static str, Vec<u8>)]) -> String {
    params
        .iter()
        .map(|(key, value)| {
            let key = byte_serialize(key.as_bytes()).collect::<String>();
            let value = byte_serialize(value).collect::<String>();
            format!("{key}={value}")
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use crate::domain::{EucKr, TextCodec};

    use super::*;

    fn entry(recipient: &str, text: &str) -> QueuedEntry {
        QueuedEntry::new(
            PhoneNumber::parse(recipient).unwrap(),
            EncodedText::from_bytes(EucKr.encode(text).unwrap()),
        )
    }

    #[test]
    fn view_form_only_carries_type() {
        assert_eq!(encode_view_form(), vec![("type", b"view".to_vec())]);
    }

    #[test]
    fn cancel_form_carries_date_and_reservation() {
        let params = encode_cancel_form(ReservationId::new(1234), "2024-03-02 12:00:00");
        assert_eq!(
            params,
            vec![
                ("date", b"2024-03-02 12:00:00".to_vec()),
                ("tr_num", b"1234".to_vec()),
            ]
        );
    }

    #[test]
    fn send_form_fields_are_in_gateway_order() {
        let params = encode_send_form(
            &SenderPhone::new("02-123-4567").unwrap(),
            &SenderIp::new("203.0.113.7").unwrap(),
            &entry("01012345678", "hello"),
            &Schedule::Immediate,
            &EncodedText::from_bytes(Vec::new()),
        );
        assert_eq!(
            params,
            vec![
                ("rphone", b"02-123-4567".to_vec()),
                ("phone", b"010-1234-5678".to_vec()),
                ("sms", b"hello".to_vec()),
                ("date", b"0".to_vec()),
                ("msg", Vec::new()),
                ("ip", b"203.0.113.7".to_vec()),
            ]
        );
    }

    #[test]
    fn form_body_percent_encodes_legacy_bytes() {
        let params = encode_send_form(
            &SenderPhone::new("02-123-4567").unwrap(),
            &SenderIp::new("203.0.113.7").unwrap(),
            &entry("010 1234 5678", "안녕 hi"),
            &Schedule::At("2024-03-01 12:03:00".to_owned()),
            &EncodedText::from_bytes(EucKr.encode("메모").unwrap()),
        );
        let body = encode_form_body(&params);
        assert_eq!(
            body,
            "rphone=02-123-4567&phone=010-1234-5678&sms=%BE%C8%B3%E7+hi\
             &date=2024-03-01+12%3A03%3A00&msg=%B8%DE%B8%F0&ip=203.0.113.7"
        );
    }

    #[test]
    fn form_body_of_empty_params_is_empty() {
        assert_eq!(encode_form_body(&[]), "");
    }
}
