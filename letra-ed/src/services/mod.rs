//! Side-effect adapters: analysis client, persistence scheduling, cloud
//! sync, and PDF export

pub mod autosave;
pub mod cloud_sync;
pub mod meter_client;
pub mod pdf;

pub use autosave::{Debouncer, CLOUD_SYNC_DEBOUNCE, LOCAL_SAVE_DEBOUNCE};
pub use cloud_sync::CloudSync;
pub use meter_client::{MeterClient, MeterError};
