// rest_api/src/service.rs

use std::sync::Arc;

use chrono::{Days, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{debug, error, info};

use models::{
    DigitalId, IssuanceTrigger, NewDigitalId, NewTouristProfile, ProfileSummary, ProfileUpdate,
    TouristProfile,
};

use crate::errors::ApiError;
use crate::storage::{DigitalIdStore, ProfileStore};

pub const PLATFORM_SOURCE: &str = "Safe Trail Platform";
pub const TOURISM_BOARD_SOURCE: &str = "North East Tourism Board";
pub const TRIGGER_PROFILE_COMPLETION: &str = "Profile Completion";
pub const TRIGGER_IDENTITY_VERIFICATION: &str = "Identity Verification";
/// Calendar days a digital ID stays valid after issuance.
pub const VALIDITY_DAYS: u64 = 30;

/// Login and profile-completion workflow. The profile service is the only
/// writer to the profile store.
pub struct ProfileService {
    profiles: Arc<ProfileStore>,
    issuance: Arc<IssuanceService>,
}

impl ProfileService {
    pub fn new(profiles: Arc<ProfileStore>, issuance: Arc<IssuanceService>) -> Self {
        Self { profiles, issuance }
    }

    /// Find-or-create login. Never overwrites an existing profile; repeated
    /// logins with the same `touristId` return the first record. The
    /// returned projection leaks no contact or medical fields.
    pub async fn login(&self, tourist_id: &str, full_name: &str) -> Result<ProfileSummary, ApiError> {
        if tourist_id.trim().is_empty() || full_name.trim().is_empty() {
            return Err(ApiError::Validation(
                "Tourist ID and Full Name are required".to_string(),
            ));
        }

        let profile = self
            .profiles
            .find_or_create(NewTouristProfile {
                tourist_id: tourist_id.to_string(),
                full_name: full_name.to_string(),
                ..Default::default()
            })
            .await;
        info!(
            tourist_id = %profile.tourist_id,
            profile_completed = profile.profile_completed,
            "login"
        );
        Ok(profile.summary())
    }

    /// Marks a profile complete. Validation order: accommodation first
    /// (mandatory, non-blank after trimming), then profile existence.
    /// Every successful call forces `profileCompleted = true` and attempts
    /// digital-ID issuance synchronously; issuance failure is logged and
    /// never rolls back the completion.
    pub async fn complete_profile(
        &self,
        tourist_id: &str,
        mut update: ProfileUpdate,
    ) -> Result<TouristProfile, ApiError> {
        let accommodation_present = update
            .accommodation
            .as_deref()
            .is_some_and(|place| !place.trim().is_empty());
        if !accommodation_present {
            return Err(ApiError::Validation(
                "Place of Stay (accommodation) is mandatory for safety purposes".to_string(),
            ));
        }

        let existing = self
            .profiles
            .find_by_tourist_id(tourist_id)
            .await
            .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

        update.profile_completed = Some(true);
        let updated = self
            .profiles
            .update(existing.id, update)
            .await
            .ok_or_else(|| ApiError::Internal("Failed to update profile".to_string()))?;
        info!(tourist_id = %updated.tourist_id, "profile completed");

        if let Err(err) = self.issuance.issue(&updated).await {
            error!(
                tourist_id = %updated.tourist_id,
                "digital ID issuance failed: {}", err
            );
        }

        Ok(updated)
    }
}

/// Issues digital IDs, at most once per tourist. The issuance service is
/// the only writer to the digital-ID store.
pub struct IssuanceService {
    digital_ids: Arc<DigitalIdStore>,
}

impl IssuanceService {
    pub fn new(digital_ids: Arc<DigitalIdStore>) -> Self {
        Self { digital_ids }
    }

    /// Idempotent issuance for a completed profile. Re-completion returns
    /// the first record unchanged; the hash is never rotated.
    pub async fn issue(&self, profile: &TouristProfile) -> Result<DigitalId, ApiError> {
        if !profile.profile_completed {
            return Err(ApiError::Internal(format!(
                "refusing to issue digital ID for incomplete profile {}",
                profile.tourist_id
            )));
        }

        if let Some(existing) = self.digital_ids.find_by_tourist_id(&profile.tourist_id).await {
            debug!(tourist_id = %profile.tourist_id, "digital ID already issued, skipping");
            return Ok(existing);
        }

        let issue_date = Utc::now().date_naive();
        let valid_until = issue_date
            .checked_add_days(Days::new(VALIDITY_DAYS))
            .ok_or_else(|| {
                ApiError::Internal("validity window out of calendar range".to_string())
            })?;

        let (record, inserted) = self
            .digital_ids
            .insert_if_absent(NewDigitalId {
                tourist_profile_id: profile.id,
                tourist_id: profile.tourist_id.clone(),
                issue_date,
                valid_until,
                blockchain_hash: generate_blockchain_hash(),
                verification_level: None,
                status: None,
                triggers: vec![
                    IssuanceTrigger {
                        trigger_type: TRIGGER_PROFILE_COMPLETION.to_string(),
                        source: PLATFORM_SOURCE.to_string(),
                        date: issue_date,
                    },
                    IssuanceTrigger {
                        trigger_type: TRIGGER_IDENTITY_VERIFICATION.to_string(),
                        source: TOURISM_BOARD_SOURCE.to_string(),
                        date: issue_date,
                    },
                ],
            })
            .await;

        if inserted {
            info!(
                tourist_id = %record.tourist_id,
                valid_until = %record.valid_until,
                "digital ID issued"
            );
        } else {
            // Lost a concurrent issuance race; the first record wins.
            debug!(tourist_id = %record.tourist_id, "digital ID issued concurrently, keeping first");
        }
        Ok(record)
    }
}

/// 32 random bytes from the OS CSPRNG, hex-encoded with a `0x` prefix.
/// Cosmetic, never verified, but must not be guessable.
fn generate_blockchain_hash() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn services() -> (ProfileService, Arc<DigitalIdStore>, Arc<ProfileStore>) {
        let profiles = Arc::new(ProfileStore::new());
        let digital_ids = Arc::new(DigitalIdStore::new());
        let issuance = Arc::new(IssuanceService::new(digital_ids.clone()));
        (
            ProfileService::new(profiles.clone(), issuance),
            digital_ids,
            profiles,
        )
    }

    fn update_with_accommodation(place: &str) -> ProfileUpdate {
        ProfileUpdate {
            accommodation: Some(place.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let (service, _, _) = services();
        assert!(matches!(
            service.login("", "Asha Rai").await,
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            service.login("TID-2024-NE-123456789", "   ").await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn repeated_login_keeps_first_name() {
        let (service, _, _) = services();
        let first = service.login("TID-2024-NE-123456789", "Asha Rai").await.unwrap();
        let second = service
            .login("TID-2024-NE-123456789", "Someone Else")
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.full_name, "Asha Rai");
        assert!(!second.profile_completed);
    }

    #[tokio::test]
    async fn blank_accommodation_rejected_and_profile_untouched() {
        let (service, _, profiles) = services();
        service.login("TID-2024-NE-123456789", "Asha Rai").await.unwrap();

        for update in [
            ProfileUpdate::default(),
            update_with_accommodation(""),
            update_with_accommodation("   "),
        ] {
            assert!(matches!(
                service.complete_profile("TID-2024-NE-123456789", update).await,
                Err(ApiError::Validation(_))
            ));
        }

        let profile = profiles.find_by_tourist_id("TID-2024-NE-123456789").await.unwrap();
        assert!(!profile.profile_completed);
    }

    #[tokio::test]
    async fn completion_without_profile_is_not_found() {
        let (service, _, _) = services();
        assert!(matches!(
            service
                .complete_profile("TID-9999-NE-000000000", update_with_accommodation("Hotel"))
                .await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn completion_marks_profile_and_issues_digital_id() {
        let (service, digital_ids, _) = services();
        service.login("TID-2024-NE-123456789", "Asha Rai").await.unwrap();
        let profile = service
            .complete_profile(
                "TID-2024-NE-123456789",
                update_with_accommodation("Hotel Brahmaputra, Guwahati"),
            )
            .await
            .unwrap();
        assert!(profile.profile_completed);

        let digital_id = digital_ids
            .find_by_tourist_id("TID-2024-NE-123456789")
            .await
            .unwrap();
        assert_eq!(digital_id.tourist_profile_id, profile.id);
        assert_eq!(digital_id.status, "Active");
        assert_eq!(digital_id.verification_level, "Verified");

        let hash_shape = Regex::new(r"^0x[0-9a-f]{64}$").unwrap();
        assert!(hash_shape.is_match(&digital_id.blockchain_hash));

        assert_eq!(digital_id.valid_until, digital_id.issue_date + Days::new(VALIDITY_DAYS));
        assert_eq!(digital_id.triggers.len(), 2);
        assert_eq!(digital_id.triggers[0].trigger_type, TRIGGER_PROFILE_COMPLETION);
        assert_eq!(digital_id.triggers[0].source, PLATFORM_SOURCE);
        assert_eq!(digital_id.triggers[1].trigger_type, TRIGGER_IDENTITY_VERIFICATION);
        assert_eq!(digital_id.triggers[1].source, TOURISM_BOARD_SOURCE);
        assert_eq!(digital_id.triggers[0].date, digital_id.issue_date);
    }

    #[tokio::test]
    async fn recompletion_is_idempotent() {
        let (service, digital_ids, _) = services();
        service.login("TID-2024-NE-123456789", "Asha Rai").await.unwrap();
        service
            .complete_profile(
                "TID-2024-NE-123456789",
                update_with_accommodation("Hotel Brahmaputra, Guwahati"),
            )
            .await
            .unwrap();
        let first = digital_ids
            .find_by_tourist_id("TID-2024-NE-123456789")
            .await
            .unwrap();

        let profile = service
            .complete_profile(
                "TID-2024-NE-123456789",
                update_with_accommodation("Different Hotel"),
            )
            .await
            .unwrap();
        assert!(profile.profile_completed);
        assert_eq!(profile.accommodation, "Different Hotel");

        let second = digital_ids
            .find_by_tourist_id("TID-2024-NE-123456789")
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.blockchain_hash, first.blockchain_hash);
        assert_eq!(second.issue_date, first.issue_date);
    }

    #[tokio::test]
    async fn issuance_refuses_incomplete_profile() {
        let (_, digital_ids, profiles) = services();
        let issuance = IssuanceService::new(digital_ids.clone());
        let profile = profiles
            .create(NewTouristProfile {
                tourist_id: "TID-2024-NE-123456789".to_string(),
                full_name: "Asha Rai".to_string(),
                ..Default::default()
            })
            .await;
        assert!(issuance.issue(&profile).await.is_err());
        assert!(digital_ids.find_by_tourist_id("TID-2024-NE-123456789").await.is_none());
    }

    #[test]
    fn blockchain_hash_shape_and_uniqueness() {
        let hash_shape = Regex::new(r"^0x[0-9a-f]{64}$").unwrap();
        let first = generate_blockchain_hash();
        let second = generate_blockchain_hash();
        assert!(hash_shape.is_match(&first));
        assert_ne!(first, second);
    }
}
