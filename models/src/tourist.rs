// models/src/tourist.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default values applied when a profile is created without them.
pub const DEFAULT_NATIONALITY: &str = "Indian";
pub const DEFAULT_TRAVELER_TYPE: &str = "domestic";
/// Placeholder accommodation for login-created skeletal profiles.
pub const ACCOMMODATION_NOT_PROVIDED: &str = "Not Provided";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relation: String,
}

/// A traveler's profile record. `tourist_id` is the external, caller-supplied
/// identifier (unique, immutable after creation); `id` is the internal
/// record id. Field names serialize in camelCase to match the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouristProfile {
    pub id: Uuid,
    pub tourist_id: String,
    pub full_name: String,
    pub nationality: String,
    pub traveler_type: String,
    pub emergency_contact_1: Option<EmergencyContact>,
    pub emergency_contact_2: Option<EmergencyContact>,
    pub accommodation: String,
    pub itinerary: Option<String>,
    pub medical_conditions: Option<String>,
    pub languages: Option<String>,
    pub travel_budget: Option<String>,
    pub profile_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert shape for `ProfileStore::create`. Omitted fields take the
/// defaults above; `profile_completed` starts false.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTouristProfile {
    pub tourist_id: String,
    pub full_name: String,
    pub nationality: Option<String>,
    pub traveler_type: Option<String>,
    pub accommodation: Option<String>,
    pub emergency_contact_1: Option<EmergencyContact>,
    pub emergency_contact_2: Option<EmergencyContact>,
}

/// Partial update submitted at profile completion. `accommodation` is the
/// one mandatory field, validated by the profile service before the merge.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub nationality: Option<String>,
    pub traveler_type: Option<String>,
    pub emergency_contact_1: Option<EmergencyContact>,
    pub emergency_contact_2: Option<EmergencyContact>,
    pub accommodation: Option<String>,
    pub itinerary: Option<String>,
    pub medical_conditions: Option<String>,
    pub languages: Option<String>,
    pub travel_budget: Option<String>,
    pub profile_completed: Option<bool>,
}

/// Minimal projection returned by login. Never carries emergency contacts
/// or medical data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: Uuid,
    pub tourist_id: String,
    pub full_name: String,
    pub profile_completed: bool,
}

impl TouristProfile {
    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            id: self.id,
            tourist_id: self.tourist_id.clone(),
            full_name: self.full_name.clone(),
            profile_completed: self.profile_completed,
        }
    }

    /// Merges a partial update onto this record. `updated_at` is stamped by
    /// the store, not here.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(v) = update.full_name {
            self.full_name = v;
        }
        if let Some(v) = update.nationality {
            self.nationality = v;
        }
        if let Some(v) = update.traveler_type {
            self.traveler_type = v;
        }
        if let Some(v) = update.emergency_contact_1 {
            self.emergency_contact_1 = Some(v);
        }
        if let Some(v) = update.emergency_contact_2 {
            self.emergency_contact_2 = Some(v);
        }
        if let Some(v) = update.accommodation {
            self.accommodation = v;
        }
        if let Some(v) = update.itinerary {
            self.itinerary = Some(v);
        }
        if let Some(v) = update.medical_conditions {
            self.medical_conditions = Some(v);
        }
        if let Some(v) = update.languages {
            self.languages = Some(v);
        }
        if let Some(v) = update.travel_budget {
            self.travel_budget = Some(v);
        }
        if let Some(v) = update.profile_completed {
            self.profile_completed = v;
        }
    }
}
