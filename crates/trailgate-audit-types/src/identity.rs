//! Caller identity attached to every event of a flush.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Kind of principal that submits the events.
///
/// Every event is tagged as a user, whatever credentials the caller holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString)]
pub enum PrincipalType {
    /// A user principal.
    #[default]
    User,
}

/// Who is submitting events, resolved once per flush.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
    /// Principal identifier of the caller.
    pub principal_id: String,
    /// Account the events are recorded for.
    pub recipient_account_id: String,
    /// Principal type tag.
    pub principal_type: PrincipalType,
}

impl IdentityContext {
    /// Create an identity with the default principal type.
    pub fn new(principal_id: impl Into<String>, recipient_account_id: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            recipient_account_id: recipient_account_id.into(),
            principal_type: PrincipalType::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_principal_type_strings() {
        assert_eq!(PrincipalType::User.to_string(), "User");
        assert_eq!(PrincipalType::from_str("User").unwrap(), PrincipalType::User);
        assert!(PrincipalType::from_str("AssumedRole").is_err());
        assert_eq!(
            serde_json::to_string(&PrincipalType::User).unwrap(),
            "\"User\""
        );
    }

    #[test]
    fn test_identity_defaults_to_user() {
        let identity = IdentityContext::new("AIDAEXAMPLE", "123456789012");
        assert_eq!(identity.principal_type, PrincipalType::User);
    }
}
