//! Runtime permission negotiation

use crate::core::constants::RUNTIME_PERMISSION_API_LEVEL;
use crate::core::PermissionState;
use crate::platform::error::PlatformResult;

/// Per-permission answer in a [`PermissionResponse`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantResult {
    Granted,
    Denied,
}

/// Raw answer to a permission request, as delivered by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionResponse {
    /// Permission identifiers the answer refers to
    pub permissions: Vec<String>,
    /// One grant result per identifier
    pub grant_results: Vec<GrantResult>,
}

/// Shape violations in a [`PermissionResponse`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedResponse {
    #[error("permission array has {count} elements instead of exactly one")]
    PermissionCount { count: usize },
    #[error("unexpected element in permission array: {found}")]
    UnexpectedPermission { found: String },
    #[error("grant result array has {count} elements instead of exactly one")]
    GrantCount { count: usize },
}

impl PermissionResponse {
    /// Response for a single permission
    pub fn single(permission: &str, result: GrantResult) -> Self {
        Self {
            permissions: vec![permission.to_string()],
            grant_results: vec![result],
        }
    }

    /// Check that the response answers exactly `expected` and extract its grant result.
    ///
    /// Any other shape is a platform contract violation and never a user decision.
    pub fn validate(&self, expected: &str) -> Result<GrantResult, MalformedResponse> {
        if self.permissions.len() != 1 {
            return Err(MalformedResponse::PermissionCount {
                count: self.permissions.len(),
            });
        }
        if self.permissions[0] != expected {
            return Err(MalformedResponse::UnexpectedPermission {
                found: self.permissions[0].clone(),
            });
        }
        match self.grant_results.as_slice() {
            [result] => Ok(*result),
            other => Err(MalformedResponse::GrantCount { count: other.len() }),
        }
    }
}

/// Handler invoked exactly once with the platform's answer to a grant request
pub type GrantHandler = Box<dyn FnOnce(PermissionResponse) + Send>;

/// Access to the runtime permission system
pub trait PermissionGate: Send {
    /// Current state of `permission`, without prompting
    fn current_state(&self, permission: &str) -> PermissionState;

    /// Ask the user to grant `permission`; `handler` receives the raw answer
    fn request_grant(&mut self, permission: &str, handler: GrantHandler) -> PlatformResult<()>;
}

impl<G: PermissionGate + ?Sized> PermissionGate for Box<G> {
    fn current_state(&self, permission: &str) -> PermissionState {
        (**self).current_state(permission)
    }

    fn request_grant(&mut self, permission: &str, handler: GrantHandler) -> PlatformResult<()> {
        (**self).request_grant(permission, handler)
    }
}

/// Gate that bypasses runtime checks on platforms older than API level 23,
/// where permissions are granted at install time
pub struct ApiLevelGate<G> {
    api_level: u32,
    inner: G,
}

impl<G: PermissionGate> ApiLevelGate<G> {
    pub fn new(api_level: u32, inner: G) -> Self {
        Self { api_level, inner }
    }

    /// Whether runtime permission checks apply on this platform
    pub fn runtime_checks(&self) -> bool {
        self.api_level >= RUNTIME_PERMISSION_API_LEVEL
    }
}

impl<G: PermissionGate> PermissionGate for ApiLevelGate<G> {
    fn current_state(&self, permission: &str) -> PermissionState {
        if self.runtime_checks() {
            self.inner.current_state(permission)
        } else {
            PermissionState::Granted
        }
    }

    fn request_grant(&mut self, permission: &str, handler: GrantHandler) -> PlatformResult<()> {
        if self.runtime_checks() {
            self.inner.request_grant(permission, handler)
        } else {
            handler(PermissionResponse::single(permission, GrantResult::Granted));
            Ok(())
        }
    }
}
