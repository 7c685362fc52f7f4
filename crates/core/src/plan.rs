//! Subscription plan tier.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Plan tier of a user, stored and transmitted as a small integer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum Plan {
    #[default]
    Free,
    Standard,
    Premium,
}

impl Plan {
    pub fn as_i16(self) -> i16 {
        match self {
            Plan::Free => 0,
            Plan::Standard => 1,
            Plan::Premium => 2,
        }
    }
}

impl From<Plan> for i16 {
    fn from(value: Plan) -> Self {
        value.as_i16()
    }
}

impl TryFrom<i16> for Plan {
    type Error = DomainError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Plan::Free),
            1 => Ok(Plan::Standard),
            2 => Ok(Plan::Premium),
            other => Err(DomainError::validation(format!("unknown plan tier {other}"))),
        }
    }
}

impl core::fmt::Display for Plan {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Plan::Free => write!(f, "free"),
            Plan::Standard => write!(f, "standard"),
            Plan::Premium => write!(f, "premium"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Plan::Premium).unwrap(), "2");
        let plan: Plan = serde_json::from_str("1").unwrap();
        assert_eq!(plan, Plan::Standard);
    }

    #[test]
    fn rejects_unknown_tier() {
        assert!(serde_json::from_str::<Plan>("7").is_err());
        assert!(matches!(Plan::try_from(-1), Err(DomainError::Validation(_))));
    }
}
