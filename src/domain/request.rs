use chrono::{DateTime, Local, TimeDelta};

use crate::domain::codec::{EncodedText, TextCodec};
use crate::domain::message::encode_text;
use crate::domain::validation::ValidationError;

/// Reservations closer than this to the current time are rejected.
pub const MIN_SCHEDULE_LEAD: TimeDelta = TimeDelta::minutes(3);

/// How far ahead the `date` of a cancellation request is set.
pub const CANCEL_DATE_OFFSET: TimeDelta = TimeDelta::days(1);

/// Wall-clock format the gateway expects for `date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Free-form memo attached to a send (`msg`).
pub enum Comment {
    /// Text, encoded with the client's codec before sending.
    Text(String),
    /// Bytes already in the gateway encoding; sent untouched.
    Encoded(EncodedText),
}

impl Comment {
    /// Form field name used by the gateway (`msg`).
    pub const FIELD: &'static str = "msg";

    pub(crate) fn encode(&self, codec: &dyn TextCodec) -> Result<EncodedText, ValidationError> {
        match self {
            Self::Text(text) => encode_text(codec, Self::FIELD, text),
            Self::Encoded(bytes) => Ok(bytes.clone()),
        }
    }
}

impl From<&str> for Comment {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Comment {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[derive(Debug, Clone, Default)]
/// Options for [`crate::PhpsClient::send`].
pub struct SendOptions {
    /// Deliver at this local time instead of immediately. Must be at least
    /// [`MIN_SCHEDULE_LEAD`] in the future.
    pub scheduled_at: Option<DateTime<Local>>,
    pub comment: Option<Comment>,
}

impl SendOptions {
    pub fn scheduled_at(mut self, at: DateTime<Local>) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    pub fn comment(mut self, comment: impl Into<Comment>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Delivery time as sent in the `date` field.
pub enum Schedule {
    Immediate,
    At(String),
}

impl Schedule {
    /// Form field name used by the gateway (`date`).
    pub const FIELD: &'static str = "date";

    /// Sentinel the gateway reads as "send now".
    pub const IMMEDIATE: &'static str = "0";

    /// Resolve the requested delivery time against `now`.
    pub fn resolve(
        scheduled_at: Option<DateTime<Local>>,
        now: DateTime<Local>,
    ) -> Result<Self, ValidationError> {
        let Some(at) = scheduled_at else {
            return Ok(Self::Immediate);
        };

        let earliest = now + MIN_SCHEDULE_LEAD;
        if at < earliest {
            return Err(ValidationError::SchedulingTooSoon {
                scheduled_at: at.format(DATE_FORMAT).to_string(),
                earliest: earliest.format(DATE_FORMAT).to_string(),
            });
        }

        Ok(Self::At(at.format(DATE_FORMAT).to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Immediate => Self::IMMEDIATE,
            Self::At(date) => date,
        }
    }
}

/// `date` value of a cancellation request issued at `now`.
pub fn cancel_date(now: DateTime<Local>) -> String {
    (now + CANCEL_DATE_OFFSET).format(DATE_FORMAT).to_string()
}
