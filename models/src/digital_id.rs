// models/src/digital_id.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STATUS_ACTIVE: &str = "Active";
pub const VERIFICATION_LEVEL_VERIFIED: &str = "Verified";

/// Why a digital ID was issued. The issuance service records a fixed pair
/// of these ("Profile Completion" and "Identity Verification").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuanceTrigger {
    #[serde(rename = "type")]
    pub trigger_type: String,
    pub source: String,
    pub date: NaiveDate,
}

/// A derived identity record, issued at most once per tourist when their
/// profile is completed. `issue_date` and `valid_until` are date-only;
/// `blockchain_hash` is cosmetic and never recomputed or verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalId {
    pub id: Uuid,
    pub tourist_profile_id: Uuid,
    pub tourist_id: String,
    pub issue_date: NaiveDate,
    pub valid_until: NaiveDate,
    pub verification_level: String,
    pub blockchain_hash: String,
    pub status: String,
    pub triggers: Vec<IssuanceTrigger>,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for `DigitalIdStore`. `status` and `verification_level`
/// default to "Active" / "Verified" when omitted.
#[derive(Debug, Clone)]
pub struct NewDigitalId {
    pub tourist_profile_id: Uuid,
    pub tourist_id: String,
    pub issue_date: NaiveDate,
    pub valid_until: NaiveDate,
    pub blockchain_hash: String,
    pub verification_level: Option<String>,
    pub status: Option<String>,
    pub triggers: Vec<IssuanceTrigger>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_serializes_type_key() {
        let trigger = IssuanceTrigger {
            trigger_type: "Profile Completion".to_string(),
            source: "Safe Trail Platform".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
        };
        let value = serde_json::to_value(&trigger).unwrap();
        assert_eq!(value["type"], "Profile Completion");
        assert_eq!(value["date"], "2024-04-02");
    }

    #[test]
    fn digital_id_serializes_with_camel_case_keys() {
        let record = DigitalId {
            id: Uuid::new_v4(),
            tourist_profile_id: Uuid::new_v4(),
            tourist_id: "TID-2024-NE-123456789".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            verification_level: VERIFICATION_LEVEL_VERIFIED.to_string(),
            blockchain_hash: format!("0x{}", "ab".repeat(32)),
            status: STATUS_ACTIVE.to_string(),
            triggers: vec![],
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&record).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("touristProfileId"));
        assert!(obj.contains_key("issueDate"));
        assert!(obj.contains_key("validUntil"));
        assert!(obj.contains_key("blockchainHash"));
        assert!(obj.contains_key("verificationLevel"));
        assert_eq!(value["issueDate"], "2024-04-02");
    }
}
