// rest_api/src/storage.rs
//
// In-memory stores for the process lifetime. Both maps are keyed by the
// external `touristId`, which doubles as the uniqueness constraint: any
// check-then-insert sequence runs under a single lock acquisition, so two
// concurrent writers can never mint two records for one tourist.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use models::tourist::{ACCOMMODATION_NOT_PROVIDED, DEFAULT_NATIONALITY, DEFAULT_TRAVELER_TYPE};
use models::digital_id::{STATUS_ACTIVE, VERIFICATION_LEVEL_VERIFIED};
use models::{DigitalId, NewDigitalId, NewTouristProfile, ProfileUpdate, TouristProfile};

/// Keyed persistence of `TouristProfile` records. Volatile; lost on restart.
#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: Mutex<HashMap<String, TouristProfile>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn find_by_tourist_id(&self, tourist_id: &str) -> Option<TouristProfile> {
        self.profiles.lock().await.get(tourist_id).cloned()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<TouristProfile> {
        self.profiles
            .lock()
            .await
            .values()
            .find(|profile| profile.id == id)
            .cloned()
    }

    /// Inserts a fresh profile, applying defaults for omitted fields.
    /// Callers that cannot rule out an existing record for the same
    /// `touristId` must use `find_or_create` instead.
    pub async fn create(&self, new: NewTouristProfile) -> TouristProfile {
        let profile = build_profile(new);
        self.profiles
            .lock()
            .await
            .insert(profile.tourist_id.clone(), profile.clone());
        profile
    }

    /// Atomic find-or-create: if a profile already exists for the
    /// `touristId`, it is returned untouched and `new` is discarded.
    pub async fn find_or_create(&self, new: NewTouristProfile) -> TouristProfile {
        let mut profiles = self.profiles.lock().await;
        if let Some(existing) = profiles.get(&new.tourist_id) {
            return existing.clone();
        }
        let profile = build_profile(new);
        profiles.insert(profile.tourist_id.clone(), profile.clone());
        profile
    }

    /// Merges partial fields onto the record with the given internal id and
    /// refreshes `updatedAt`. Returns `None` if the id is unknown.
    pub async fn update(&self, id: Uuid, changes: ProfileUpdate) -> Option<TouristProfile> {
        let mut profiles = self.profiles.lock().await;
        let profile = profiles.values_mut().find(|profile| profile.id == id)?;
        profile.apply(changes);
        profile.updated_at = Utc::now();
        Some(profile.clone())
    }
}

fn build_profile(new: NewTouristProfile) -> TouristProfile {
    let now = Utc::now();
    TouristProfile {
        id: Uuid::new_v4(),
        tourist_id: new.tourist_id,
        full_name: new.full_name,
        nationality: new.nationality.unwrap_or_else(|| DEFAULT_NATIONALITY.to_string()),
        traveler_type: new
            .traveler_type
            .unwrap_or_else(|| DEFAULT_TRAVELER_TYPE.to_string()),
        emergency_contact_1: new.emergency_contact_1,
        emergency_contact_2: new.emergency_contact_2,
        accommodation: new
            .accommodation
            .unwrap_or_else(|| ACCOMMODATION_NOT_PROVIDED.to_string()),
        itinerary: None,
        medical_conditions: None,
        languages: None,
        travel_budget: None,
        profile_completed: false,
        created_at: now,
        updated_at: now,
    }
}

/// Keyed persistence of `DigitalId` records. At most one per `touristId`.
#[derive(Debug, Default)]
pub struct DigitalIdStore {
    digital_ids: Mutex<HashMap<String, DigitalId>>,
}

impl DigitalIdStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn find_by_tourist_id(&self, tourist_id: &str) -> Option<DigitalId> {
        self.digital_ids.lock().await.get(tourist_id).cloned()
    }

    /// Atomic insert-if-absent. Returns the stored record plus whether this
    /// call inserted it; a concurrent duplicate attempt gets the first
    /// record back and never replaces it.
    pub async fn insert_if_absent(&self, new: NewDigitalId) -> (DigitalId, bool) {
        let mut digital_ids = self.digital_ids.lock().await;
        if let Some(existing) = digital_ids.get(&new.tourist_id) {
            return (existing.clone(), false);
        }
        let record = DigitalId {
            id: Uuid::new_v4(),
            tourist_profile_id: new.tourist_profile_id,
            tourist_id: new.tourist_id.clone(),
            issue_date: new.issue_date,
            valid_until: new.valid_until,
            verification_level: new
                .verification_level
                .unwrap_or_else(|| VERIFICATION_LEVEL_VERIFIED.to_string()),
            blockchain_hash: new.blockchain_hash,
            status: new.status.unwrap_or_else(|| STATUS_ACTIVE.to_string()),
            triggers: new.triggers,
            created_at: Utc::now(),
        };
        digital_ids.insert(new.tourist_id, record.clone());
        (record, true)
    }
}
