//! GPS distance tracker
//!
//! Acquires a single location fix on demand, reports the great-circle distance to the
//! previously stored fix and replaces the stored fix with the new one.

pub mod core;
pub mod platform;
pub mod storage;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use crate::core::{EarthModel, GeoPosition, InvalidCoordinate, PermissionState};
pub use crate::core::geodesy::great_circle_distance_m;
pub use crate::platform::{
    AcquisitionFailure, ApiLevelGate, LocationGateway, MockLocationGateway, MockPermissionGate,
    PermissionGate, PermissionResponse, PlatformError,
};
pub use crate::storage::{CoordinateStore, JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use crate::utils::{AppConfig, ConfigError};
pub use crate::api::{
    Collaborators, Dialog, DialogKind, DistanceFormatter, DistanceTracker, HostUi,
    NumberLocale, RecordingHost, SetupError, TriggerOutcome, WorkflowError, WorkflowResult, WorkflowState,
};
