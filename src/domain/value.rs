use std::fmt;

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
/// Zenziva account username (`userkey`).
///
/// Opaque: any value is accepted, including an empty one.
pub struct Username(String);

impl Username {
    /// Form field name used by Zenziva (`userkey`).
    pub const FIELD: &'static str = "userkey";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Default)]
/// Zenziva account password (`passkey`).
///
/// Opaque: any value is accepted. `Debug` output is redacted.
pub struct Password(String);

impl Password {
    /// Form field name used by Zenziva (`passkey`).
    pub const FIELD: &'static str = "passkey";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(\"***\")")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Receiver phone number (`nohp`), usually with a leading `0` (`08xxxxxxxx`).
///
/// Invariant: non-empty. The value is sent exactly as given.
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Form field name used by Zenziva (`nohp`).
    pub const FIELD: &'static str = "nohp";
    /// Human-readable name used in validation errors.
    pub const LABEL: &'static str = "Receiver number";

    /// Create a validated (non-empty) phone number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::LABEL });
        }
        Ok(Self(value))
    }

    /// Raw value as sent to Zenziva.
    pub fn raw(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS message text (`pesan`).
///
/// Invariant: non-empty. The original value (including whitespace) is preserved.
pub struct MessageText(String);

impl MessageText {
    /// Form field name used by Zenziva (`pesan`).
    pub const FIELD: &'static str = "pesan";
    /// Human-readable name used in validation errors.
    pub const LABEL: &'static str = "Message";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::LABEL });
        }
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Account subdomain for the `sms_center` package.
///
/// Invariant: non-empty. Whether it forms a valid host is checked when the endpoint is composed.
pub struct Subdomain(String);

impl Subdomain {
    /// Human-readable name used in validation errors.
    pub const LABEL: &'static str = "Subdomain";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::LABEL });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
