//! Transport layer: wire-format details (form encoding, PHP serialization).

mod form;
mod php;

pub use form::{
    FormParams, encode_cancel_form, encode_form_body, encode_send_form, encode_view_form,
};
pub use php::{DecodeError, DecodeErrorKind, decode_response, unserialize};
