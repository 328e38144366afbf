//! Typed Rust client for the PHP School (phps.kr) SMS gateway.
//!
//! The crate keeps the same three layers throughout: a domain layer of
//! validated types and message slicing, a transport layer for the wire format
//! (EUC-KR form bodies in, PHP-serialized arrays out), and a small client layer
//! that owns the send queue and talks to the gateway.
//!
//! ```rust,no_run
//! use phps_sms::{Credentials, PhpsClient, SendOptions, SenderPhone};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), phps_sms::PhpsSmsError> {
//!     let credentials = Credentials::new("school", "...")?;
//!     let sender = SenderPhone::new("02-123-4567")?;
//!     let mut client = PhpsClient::connect(credentials, sender).await?;
//!
//!     client.add("010-1234-5678", "안녕하세요", true)?;
//!     for response in client.send(SendOptions::default()).await? {
//!         println!("{:?}", response.get_str("result"));
//!     }
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{Credentials, PhpsClient, PhpsClientBuilder, PhpsSmsError};
pub use domain::{
    AdminUser, AuthKey, Comment, EncodedText, EucKr, GatewayResponse, MAX_MESSAGE_BYTES,
    PhoneNumber, PhpKey, PhpValue, QueuedEntry, QueuedMessage, ReservationId, ResponseKey,
    ResponseValue, SendOptions, SenderIp, SenderPhone, SliceStrategy, TextCodec,
    ValidationError,
};
pub use transport::{DecodeError, DecodeErrorKind, decode_response, unserialize};
