use std::str::FromStr;

use crate::error::PfError;

/// An email address used as the identity of a requester or an owner.
///
/// Identities are always stored in normalized (trimmed, lower case) form, so
/// comparing two identities is case-insensitive no matter where they came from.
#[derive(Clone, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize, Debug)]
#[serde(from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Normalize without validating, for values that were validated on their way in.
    pub fn new(email: impl AsRef<str>) -> Self {
        Self(email.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether two identities denote the same requester.
    ///
    /// An empty identity never matches anything.
    pub fn matches(&self, other: &Identity) -> bool {
        !self.0.is_empty() && self.0 == other.0
    }
}

impl FromStr for Identity {
    type Err = PfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let identity = Self::new(s);
        match identity.0.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(identity),
            _ => Err(PfError::unprocessable_entity([("email", "is invalid")])),
        }
    }
}

impl From<String> for Identity {
    fn from(email: String) -> Self {
        Self::new(email)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
