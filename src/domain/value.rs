use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::validation::ValidationError;

static PHONE_NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>0[0-9]0)?[\s\-.]?(?P<middle>[0-9]{3,4})[\s\-.]?(?P<last>[0-9]{4})$")
        .expect("phone number pattern is valid")
});

/// Prefix used when a number is given without its `0X0` carrier/area prefix.
pub const DEFAULT_PREFIX: &str = "010";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Gateway account id (`adminuser`), the SMS id registered with PHP School.
///
/// Invariant: non-empty after trimming.
pub struct AdminUser(String);

impl AdminUser {
    /// Form field name used by the gateway (`adminuser`).
    pub const FIELD: &'static str = "adminuser";

    /// Create a validated [`AdminUser`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated account id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// Gateway authentication key (`authkey`).
///
/// Invariant: non-empty after trimming. `Debug` output is redacted.
pub struct AuthKey(String);

impl AuthKey {
    /// Form field name used by the gateway (`authkey`).
    pub const FIELD: &'static str = "authkey";

    /// Create a validated [`AuthKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthKey(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Number shown to recipients as the sender (`rphone`).
///
/// Invariant: non-empty after trimming. The value is sent as given; it must be
/// registered with the gateway account.
pub struct SenderPhone(String);

impl SenderPhone {
    /// Form field name used by the gateway (`rphone`).
    pub const FIELD: &'static str = "rphone";

    /// Create a validated [`SenderPhone`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the sender number.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Public IP of the sending host (`ip`).
///
/// Invariant: non-empty after trimming. No address parsing is performed; the
/// value is forwarded to the gateway as text.
pub struct SenderIp(String);

impl SenderIp {
    /// Form field name used by the gateway (`ip`).
    pub const FIELD: &'static str = "ip";

    /// Create a validated [`SenderIp`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the address text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Recipient number normalized to `PPP-MMMM-SSSS` (`phone`).
///
/// Accepted input: an optional `0X0` prefix, an optional separator (space, `-`
/// or `.`), a 3-4 digit group, another optional separator and a 4 digit group.
/// Numbers without a prefix get [`DEFAULT_PREFIX`].
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Form field name used by the gateway (`phone`).
    pub const FIELD: &'static str = "phone";

    /// Validate and normalize a free-form recipient number.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let captures =
            PHONE_NUMBER_REGEX
                .captures(trimmed)
                .ok_or_else(|| ValidationError::InvalidNumber {
                    input: input.to_owned(),
                })?;

        let prefix = captures
            .name("prefix")
            .map_or(DEFAULT_PREFIX, |m| m.as_str());
        let middle = &captures["middle"];
        let last = &captures["last"];

        Ok(Self(format!("{prefix}-{middle}-{last}")))
    }

    /// Canonical dashed form as sent to the gateway.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Server-assigned number of a scheduled send (`tr_num`).
pub struct ReservationId(u64);

impl ReservationId {
    /// Form field name used by the gateway (`tr_num`).
    pub const FIELD: &'static str = "tr_num";

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for ReservationId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
