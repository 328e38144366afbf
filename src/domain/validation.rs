use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty {
        field: &'static str,
    },
    InvalidNumber {
        input: String,
    },
    EmptyMessage,
    MessageTooLong {
        len: usize,
        max: usize,
    },
    Unencodable {
        field: &'static str,
        codec: &'static str,
    },
    EmptyQueue,
    SchedulingTooSoon {
        scheduled_at: String,
        earliest: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidNumber { input } => write!(f, "`{input}` is not a valid phone number"),
            Self::EmptyMessage => write!(f, "message text is empty"),
            Self::MessageTooLong { len, max } => {
                write!(f, "message text is too long: {len} bytes (max {max})")
            }
            Self::Unencodable { field, codec } => {
                write!(f, "{field} contains characters not representable in {codec}")
            }
            Self::EmptyQueue => write!(f, "no messages queued"),
            Self::SchedulingTooSoon {
                scheduled_at,
                earliest,
            } => write!(
                f,
                "reservation must be at least 3 minutes ahead: {scheduled_at} (earliest {earliest})"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::ValidationError;

    #[test]
    fn display_messages_are_human_readable() {
        let err = ValidationError::Empty { field: "authkey" };
        assert_eq!(err.to_string(), "authkey must not be empty");

        let err = ValidationError::InvalidNumber {
            input: "abc".to_owned(),
        };
        assert_eq!(err.to_string(), "`abc` is not a valid phone number");

        let err = ValidationError::MessageTooLong { len: 91, max: 90 };
        assert_eq!(err.to_string(), "message text is too long: 91 bytes (max 90)");

        let err = ValidationError::Unencodable {
            field: "sms",
            codec: "EUC-KR",
        };
        assert_eq!(
            err.to_string(),
            "sms contains characters not representable in EUC-KR"
        );

        assert_eq!(ValidationError::EmptyQueue.to_string(), "no messages queued");
        assert_eq!(
            ValidationError::EmptyMessage.to_string(),
            "message text is empty"
        );
    }
}
