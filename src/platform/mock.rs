//! Mock platform services for testing and development
//!
//! Both mocks are cheap handles over shared state, so a test can keep a clone while the
//! tracker owns the boxed original. Queued replies are delivered synchronously from inside
//! the request call; otherwise the handler is parked until `deliver`/`respond` is called,
//! which may happen from any thread.

use crate::core::{GeoPosition, PermissionState};
use crate::platform::error::{AcquisitionFailure, PlatformError, PlatformResult};
use crate::platform::location::{FixHandler, FixOutcome, LocationGateway};
use crate::platform::permission::{GrantHandler, GrantResult, PermissionGate, PermissionResponse};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct LocationState {
    available: bool,
    disabled_providers: Vec<String>,
    queued: VecDeque<FixOutcome>,
    pending: Option<FixHandler>,
    request_count: u32,
    last_provider: Option<String>,
}

/// Mock location service
#[derive(Clone)]
pub struct MockLocationGateway {
    state: Arc<Mutex<LocationState>>,
}

impl MockLocationGateway {
    /// Create an available location service with no queued replies
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LocationState {
                available: true,
                ..Default::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LocationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer the next request immediately with `position`
    pub fn queue_fix(&self, position: GeoPosition) {
        self.lock().queued.push_back(Ok(position));
    }

    /// Answer the next request immediately with `failure`
    pub fn queue_failure(&self, failure: AcquisitionFailure) {
        self.lock().queued.push_back(Err(failure));
    }

    /// Simulate a device without location service
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Switch off a single provider
    pub fn disable_provider(&self, provider: &str) {
        self.lock().disabled_providers.push(provider.to_string());
    }

    /// Whether a request is waiting for `deliver`
    pub fn has_pending(&self) -> bool {
        self.lock().pending.is_some()
    }

    /// Invoke the parked handler; returns `false` if nothing was pending
    pub fn deliver(&self, outcome: FixOutcome) -> bool {
        let handler = self.lock().pending.take();
        match handler {
            Some(handler) => {
                handler(outcome);
                true
            }
            None => false,
        }
    }

    /// Shorthand for delivering a successful fix
    pub fn deliver_fix(&self, position: GeoPosition) -> bool {
        self.deliver(Ok(position))
    }

    /// Take the parked handler without invoking it
    pub fn take_pending(&self) -> Option<FixHandler> {
        self.lock().pending.take()
    }

    pub fn request_count(&self) -> u32 {
        self.lock().request_count
    }

    pub fn last_provider(&self) -> Option<String> {
        self.lock().last_provider.clone()
    }
}

impl Default for MockLocationGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationGateway for MockLocationGateway {
    fn request_single_fix(&mut self, provider: &str, handler: FixHandler) -> PlatformResult<()> {
        let queued = {
            let mut state = self.lock();
            if !state.available {
                return Err(PlatformError::ServiceNotFound {
                    service: "location".to_string(),
                });
            }
            if state.disabled_providers.iter().any(|p| p == provider) {
                return Err(PlatformError::ProviderUnavailable {
                    provider: provider.to_string(),
                });
            }
            state.request_count += 1;
            state.last_provider = Some(provider.to_string());

            // A new request supersedes a parked one, as with a re-registered listener
            match state.queued.pop_front() {
                Some(outcome) => Some((handler, outcome)),
                None => {
                    state.pending = Some(handler);
                    None
                }
            }
        };

        if let Some((handler, outcome)) = queued {
            handler(outcome);
        }
        Ok(())
    }
}

struct PermissionMockState {
    state: PermissionState,
    available: bool,
    queued: VecDeque<PermissionResponse>,
    pending: Option<GrantHandler>,
    request_count: u32,
    last_permission: Option<String>,
}

/// Mock runtime permission system
#[derive(Clone)]
pub struct MockPermissionGate {
    state: Arc<Mutex<PermissionMockState>>,
}

impl MockPermissionGate {
    pub fn new(initial: PermissionState) -> Self {
        Self {
            state: Arc::new(Mutex::new(PermissionMockState {
                state: initial,
                available: true,
                queued: VecDeque::new(),
                pending: None,
                request_count: 0,
                last_permission: None,
            })),
        }
    }

    /// Gate where the permission has already been granted
    pub fn granted() -> Self {
        Self::new(PermissionState::Granted)
    }

    fn lock(&self) -> MutexGuard<'_, PermissionMockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_state(&self, state: PermissionState) {
        self.lock().state = state;
    }

    /// Simulate a platform that cannot show the permission prompt
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Answer the next request immediately with `response`
    pub fn queue_response(&self, response: PermissionResponse) {
        self.lock().queued.push_back(response);
    }

    /// Whether a request is waiting for `respond`
    pub fn has_pending(&self) -> bool {
        self.lock().pending.is_some()
    }

    /// Invoke the parked handler; returns `false` if nothing was pending
    pub fn respond(&self, response: PermissionResponse) -> bool {
        let handler = {
            let mut state = self.lock();
            let handler = state.pending.take();
            if handler.is_some() {
                apply_decision(&mut state, &response);
            }
            handler
        };

        match handler {
            Some(handler) => {
                handler(response);
                true
            }
            None => false,
        }
    }

    pub fn request_count(&self) -> u32 {
        self.lock().request_count
    }

    pub fn last_permission(&self) -> Option<String> {
        self.lock().last_permission.clone()
    }
}

/// Remember a well-formed decision the way the platform would
fn apply_decision(state: &mut PermissionMockState, response: &PermissionResponse) {
    if let [result] = response.grant_results.as_slice() {
        if response.permissions.len() == 1 {
            state.state = match result {
                GrantResult::Granted => PermissionState::Granted,
                GrantResult::Denied => PermissionState::Denied,
            };
        }
    }
}

impl PermissionGate for MockPermissionGate {
    fn current_state(&self, _permission: &str) -> PermissionState {
        self.lock().state
    }

    fn request_grant(&mut self, permission: &str, handler: GrantHandler) -> PlatformResult<()> {
        let queued = {
            let mut state = self.lock();
            if !state.available {
                return Err(PlatformError::ServiceNotFound {
                    service: "permission".to_string(),
                });
            }
            state.request_count += 1;
            state.last_permission = Some(permission.to_string());

            match state.queued.pop_front() {
                Some(response) => {
                    apply_decision(&mut state, &response);
                    Some((handler, response))
                }
                None => {
                    state.pending = Some(handler);
                    None
                }
            }
        };

        if let Some((handler, response)) = queued {
            handler(response);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{FINE_LOCATION_PERMISSION, GPS_PROVIDER};
    use std::sync::mpsc;

    fn pos(lat: f64, lon: f64) -> GeoPosition {
        GeoPosition::new(lat, lon).unwrap()
    }

    #[test]
    fn test_queued_fix_is_delivered_synchronously() {
        let mut gateway = MockLocationGateway::new();
        gateway.queue_fix(pos(52.5, 13.4));

        let (tx, rx) = mpsc::channel();
        gateway
            .request_single_fix(GPS_PROVIDER, Box::new(move |outcome: FixOutcome| tx.send(outcome).unwrap()))
            .unwrap();

        assert_eq!(rx.try_recv().unwrap(), Ok(pos(52.5, 13.4)));
        assert!(!gateway.has_pending());
        assert_eq!(gateway.request_count(), 1);
        assert_eq!(gateway.last_provider().as_deref(), Some(GPS_PROVIDER));
    }

    #[test]
    fn test_parked_fix_is_delivered_later() {
        let mut gateway = MockLocationGateway::new();
        let (tx, rx) = mpsc::channel();
        gateway
            .request_single_fix(GPS_PROVIDER, Box::new(move |outcome: FixOutcome| tx.send(outcome).unwrap()))
            .unwrap();

        assert!(rx.try_recv().is_err());
        assert!(gateway.has_pending());

        assert!(gateway.deliver_fix(pos(1.0, 2.0)));
        assert_eq!(rx.try_recv().unwrap(), Ok(pos(1.0, 2.0)));
        assert!(!gateway.deliver_fix(pos(1.0, 2.0)));
    }

    #[test]
    fn test_unavailable_service() {
        let mut gateway = MockLocationGateway::new();
        gateway.set_available(false);

        let result = gateway.request_single_fix(GPS_PROVIDER, Box::new(|_: FixOutcome| {}));
        assert!(matches!(result, Err(PlatformError::ServiceNotFound { .. })));
        assert_eq!(gateway.request_count(), 0);
    }

    #[test]
    fn test_disabled_provider() {
        let mut gateway = MockLocationGateway::new();
        gateway.disable_provider(GPS_PROVIDER);

        let result = gateway.request_single_fix(GPS_PROVIDER, Box::new(|_: FixOutcome| {}));
        assert_eq!(
            result,
            Err(PlatformError::ProviderUnavailable {
                provider: GPS_PROVIDER.to_string()
            })
        );
        assert!(gateway.request_single_fix("network", Box::new(|_: FixOutcome| {})).is_ok());
    }

    #[test]
    fn test_permission_response_updates_state() {
        let mut gate = MockPermissionGate::new(PermissionState::NotDetermined);
        let (tx, rx) = mpsc::channel();
        gate.request_grant(FINE_LOCATION_PERMISSION, Box::new(move |r: PermissionResponse| tx.send(r).unwrap()))
            .unwrap();

        assert!(gate.has_pending());
        assert!(gate.respond(PermissionResponse::single(
            FINE_LOCATION_PERMISSION,
            GrantResult::Granted
        )));

        assert_eq!(rx.try_recv().unwrap().grant_results, vec![GrantResult::Granted]);
        assert_eq!(gate.current_state(FINE_LOCATION_PERMISSION), PermissionState::Granted);
        assert_eq!(gate.last_permission().as_deref(), Some(FINE_LOCATION_PERMISSION));
    }

    #[test]
    fn test_unavailable_prompt() {
        let mut gate = MockPermissionGate::new(PermissionState::NotDetermined);
        gate.set_available(false);

        let result = gate.request_grant(FINE_LOCATION_PERMISSION, Box::new(|_: PermissionResponse| {}));
        assert!(matches!(result, Err(PlatformError::ServiceNotFound { .. })));
        assert!(!gate.has_pending());
        assert_eq!(gate.request_count(), 0);
    }

    #[test]
    fn test_queued_denial() {
        let mut gate = MockPermissionGate::new(PermissionState::NotDetermined);
        gate.queue_response(PermissionResponse::single(
            FINE_LOCATION_PERMISSION,
            GrantResult::Denied,
        ));

        let (tx, rx) = mpsc::channel();
        gate.request_grant(FINE_LOCATION_PERMISSION, Box::new(move |r: PermissionResponse| tx.send(r).unwrap()))
            .unwrap();

        assert_eq!(rx.try_recv().unwrap().grant_results, vec![GrantResult::Denied]);
        assert_eq!(gate.current_state(FINE_LOCATION_PERMISSION), PermissionState::Denied);
        assert_eq!(gate.request_count(), 1);
    }
}
