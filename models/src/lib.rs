// models/src/lib.rs

pub mod digital_id;
pub mod tourist;

pub use digital_id::{DigitalId, IssuanceTrigger, NewDigitalId};
pub use tourist::{
    EmergencyContact, NewTouristProfile, ProfileSummary, ProfileUpdate, TouristProfile,
};
