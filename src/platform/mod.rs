//! Platform service abstraction
//!
//! The OS location service and the runtime permission system are reached through the
//! [`LocationGateway`] and [`PermissionGate`] traits. Both report asynchronously through a
//! single-shot handler that may be invoked on any thread, including synchronously from inside
//! the request call.

pub mod location;
pub mod permission;
pub mod mock;
pub mod error;

pub use location::{LocationGateway, FixHandler, FixOutcome};
pub use permission::{
    PermissionGate, PermissionResponse, GrantResult, GrantHandler, ApiLevelGate, MalformedResponse,
};
pub use mock::{MockLocationGateway, MockPermissionGate};
pub use error::{PlatformError, PlatformResult, AcquisitionFailure};
