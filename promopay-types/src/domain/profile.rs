//! User profile and campaign identifiers.

use currency_rates::CurrencyCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random UserId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a UserId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for a promoted campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(Uuid);

impl CampaignId {
    /// Creates a new random CampaignId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a CampaignId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for CampaignId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CampaignId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CampaignId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The slice of a user profile this subsystem reads: wallet balance and
/// localization hints for method availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    /// Wallet points balance
    pub points: i64,
    /// Currency the user sees amounts in
    pub preferred_currency: CurrencyCode,
    /// ISO country code, when the user has set one
    pub country: Option<String>,
}

impl Profile {
    pub fn from_parts(
        user_id: UserId,
        points: i64,
        preferred_currency: CurrencyCode,
        country: Option<String>,
    ) -> Self {
        Self {
            user_id,
            points,
            preferred_currency,
            country,
        }
    }

    /// Whether the wallet covers the given point cost.
    pub fn has_points(&self, needed: i64) -> bool {
        self.points >= needed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_points() {
        let profile = Profile::from_parts(UserId::new(), 500, CurrencyCode::USD, None);
        assert!(profile.has_points(500));
        assert!(!profile.has_points(501));
    }
}
