//! UUID utilities
//!
//! Element ids are UUIDv4, collision-free under bulk import where many
//! elements are created within the same millisecond.

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}
