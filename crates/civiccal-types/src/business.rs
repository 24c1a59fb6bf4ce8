use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::user::UserId;

/// Unique identifier for a business, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusinessId(pub Uuid);

impl BusinessId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for BusinessId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BusinessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BusinessId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A registered business on the platform.
///
/// A business is owned by one user and may list additional members
/// (employees). The calendar aggregator unions both relations when
/// discovering the businesses a user works for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: BusinessId,
    pub owner_id: UserId,
    /// Employees listed on the business, excluding the owner.
    pub member_ids: Vec<UserId>,
    pub title: String,
    pub status: BusinessStatus,
    pub created_at: DateTime<Utc>,
}

impl Business {
    /// True when the user owns the business or is listed as a member.
    pub fn involves(&self, user_id: &UserId) -> bool {
        self.owner_id == *user_id || self.member_ids.contains(user_id)
    }
}

/// Business lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessStatus {
    Active,
    Suspended,
    Closed,
}

impl fmt::Display for BusinessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusinessStatus::Active => write!(f, "active"),
            BusinessStatus::Suspended => write!(f, "suspended"),
            BusinessStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for BusinessStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(BusinessStatus::Active),
            "suspended" => Ok(BusinessStatus::Suspended),
            "closed" => Ok(BusinessStatus::Closed),
            other => Err(format!("invalid business status: '{other}'")),
        }
    }
}

impl Default for BusinessStatus {
    fn default() -> Self {
        BusinessStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn involves_matches_owner_and_members() {
        let owner = UserId::new();
        let member = UserId::new();
        let outsider = UserId::new();
        let business = Business {
            id: BusinessId::new(),
            owner_id: owner,
            member_ids: vec![member],
            title: "Riverside Clinic Group".to_string(),
            status: BusinessStatus::Active,
            created_at: Utc::now(),
        };

        assert!(business.involves(&owner));
        assert!(business.involves(&member));
        assert!(!business.involves(&outsider));
    }

    #[test]
    fn status_round_trips_through_str() {
        assert_eq!(
            "suspended".parse::<BusinessStatus>().unwrap(),
            BusinessStatus::Suspended
        );
        assert_eq!(BusinessStatus::Closed.to_string(), "closed");
        assert!("defunct".parse::<BusinessStatus>().is_err());
    }
}
