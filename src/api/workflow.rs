//! Distance-tracking workflow
//!
//! One cycle runs per trigger: `Idle -> [AwaitingPermission] -> AwaitingFix -> Idle`. Every
//! cycle carries a ticket; handlers and timeouts only act on the cycle whose ticket they hold,
//! so a fix arriving after its timeout cannot touch the store or the next cycle.
//!
//! Collaborators are never called while the cycle lock is held. A gateway may therefore invoke
//! its handler synchronously from inside the request, or later from any thread. The busy
//! indicator is only cleared by the cycle that recorded showing it.

use crate::api::formatting::DistanceFormatter;
use crate::api::host::{Dialog, HostUi};
use crate::api::types::{SetupError, TriggerOutcome, WorkflowError, WorkflowResult, WorkflowState};
use crate::core::constants::FINE_LOCATION_PERMISSION;
use crate::core::{EarthModel, GeoPosition, PermissionState};
use crate::platform::{
    AcquisitionFailure, ApiLevelGate, FixHandler, FixOutcome, GrantHandler, GrantResult,
    LocationGateway, PermissionGate, PermissionResponse,
};
use crate::storage::{CoordinateStore, JsonFileStore, StoreResult};
use crate::utils::config::{AppConfig, ConfigResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    AwaitingPermission { ticket: u64 },
    AwaitingFix { ticket: u64, deadline: Instant },
    /// Fix received; store read and write in progress
    Completing { ticket: u64 },
}

impl Phase {
    fn ticket(&self) -> Option<u64> {
        match *self {
            Phase::Idle => None,
            Phase::AwaitingPermission { ticket }
            | Phase::AwaitingFix { ticket, .. }
            | Phase::Completing { ticket } => Some(ticket),
        }
    }

    fn state(&self) -> WorkflowState {
        match self {
            Phase::Idle => WorkflowState::Idle,
            Phase::AwaitingPermission { .. } => WorkflowState::AwaitingPermission,
            Phase::AwaitingFix { .. } | Phase::Completing { .. } => WorkflowState::AwaitingFix,
        }
    }
}

struct Cycle {
    phase: Phase,
    last_ticket: u64,
    last_result: Option<WorkflowResult>,
    completed: u32,
    /// Set once the current cycle has shown the busy indicator
    busy_shown: bool,
}

struct Shared {
    cycle: Mutex<Cycle>,
    store: Mutex<CoordinateStore>,
    location: Mutex<Box<dyn LocationGateway>>,
    permission: Mutex<Box<dyn PermissionGate>>,
    host: Arc<dyn HostUi>,
    formatter: DistanceFormatter,
    earth_model: EarthModel,
    provider: String,
    fix_timeout: Duration,
}

/// External services the tracker drives
pub struct Collaborators {
    pub store: CoordinateStore,
    pub location: Box<dyn LocationGateway>,
    pub permission: Box<dyn PermissionGate>,
    pub host: Arc<dyn HostUi>,
}

/// Handle to a distance tracker; clones share the same cycle
#[derive(Clone)]
pub struct DistanceTracker {
    shared: Arc<Shared>,
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl DistanceTracker {
    /// Create a tracker after validating `config`; the permission gate is wrapped for the
    /// configured API level
    pub fn new(config: &AppConfig, collaborators: Collaborators) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::assemble(config, collaborators))
    }

    fn assemble(config: &AppConfig, collaborators: Collaborators) -> Self {
        let permission: Box<dyn PermissionGate> =
            Box::new(ApiLevelGate::new(config.api_level, collaborators.permission));

        Self {
            shared: Arc::new(Shared {
                cycle: Mutex::new(Cycle {
                    phase: Phase::Idle,
                    last_ticket: 0,
                    last_result: None,
                    completed: 0,
                    busy_shown: false,
                }),
                store: Mutex::new(collaborators.store),
                location: Mutex::new(collaborators.location),
                permission: Mutex::new(permission),
                host: collaborators.host,
                formatter: DistanceFormatter::new(config.number_locale()),
                earth_model: config.earth_model,
                provider: config.provider.clone(),
                fix_timeout: config.fix_timeout(),
            }),
        }
    }

    /// Create a tracker persisting to the JSON namespace named in `config`
    pub fn open(
        config: &AppConfig,
        location: Box<dyn LocationGateway>,
        permission: Box<dyn PermissionGate>,
        host: Arc<dyn HostUi>,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        let backend = JsonFileStore::open(&config.store_dir, &config.store_namespace)?;

        Ok(Self::assemble(
            config,
            Collaborators {
                store: CoordinateStore::new(Box::new(backend)),
                location,
                permission,
                host,
            },
        ))
    }

    fn from_weak(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    pub fn state(&self) -> WorkflowState {
        lock(&self.shared.cycle).phase.state()
    }

    /// Whether a cycle is in progress
    pub fn is_busy(&self) -> bool {
        self.state() != WorkflowState::Idle
    }

    /// Remove and return the result of the most recent cycle
    pub fn take_result(&self) -> Option<WorkflowResult> {
        lock(&self.shared.cycle).last_result.take()
    }

    /// Number of cycles that reached a result
    pub fn completed_cycles(&self) -> u32 {
        lock(&self.shared.cycle).completed
    }

    pub fn formatter(&self) -> &DistanceFormatter {
        &self.shared.formatter
    }

    /// Currently stored fix
    pub fn stored_position(&self) -> StoreResult<Option<GeoPosition>> {
        lock(&self.shared.store).load()
    }

    /// Start a cycle. Ignored while another cycle is in progress.
    pub fn trigger(&self) -> TriggerOutcome {
        let permission_state = lock(&self.shared.permission).current_state(FINE_LOCATION_PERMISSION);
        let granted = permission_state == PermissionState::Granted;

        let ticket = {
            let mut cycle = lock(&self.shared.cycle);
            if cycle.phase != Phase::Idle {
                warn!(state = ?cycle.phase.state(), "trigger ignored, cycle in progress");
                return TriggerOutcome::Ignored;
            }

            cycle.last_ticket += 1;
            let ticket = cycle.last_ticket;
            cycle.phase = if granted {
                Phase::AwaitingFix {
                    ticket,
                    deadline: self.deadline(),
                }
            } else {
                Phase::AwaitingPermission { ticket }
            };
            ticket
        };

        info!(ticket, ?permission_state, "distance cycle started");

        if granted {
            self.request_fix(ticket);
        } else {
            self.request_permission(ticket);
        }

        TriggerOutcome::Started { ticket }
    }

    /// End an overdue fix request; see [`poll_timeout_at`](Self::poll_timeout_at)
    pub fn poll_timeout(&self) -> bool {
        self.poll_timeout_at(Instant::now())
    }

    /// Fail the outstanding fix request if its deadline is at or before `now`.
    ///
    /// Returns `true` if a cycle was ended.
    pub fn poll_timeout_at(&self, now: Instant) -> bool {
        let cycle = lock(&self.shared.cycle);
        let phase = cycle.phase;

        match phase {
            Phase::AwaitingFix { ticket, deadline } if now >= deadline => {
                let timeout_ms = self.shared.fix_timeout.as_millis() as u64;
                warn!(ticket, timeout_ms, "fix request timed out");
                let failure = AcquisitionFailure::Timeout { timeout_ms };
                self.settle_locked(cycle, ticket, WorkflowError::AcquisitionFailed(failure).into());
                true
            }
            _ => false,
        }
    }

    fn deadline(&self) -> Instant {
        Instant::now() + self.shared.fix_timeout
    }

    fn request_permission(&self, ticket: u64) {
        let weak = Arc::downgrade(&self.shared);
        let handler: GrantHandler = Box::new(move |response: PermissionResponse| {
            if let Some(tracker) = Self::from_weak(&weak) {
                tracker.on_permission_response(ticket, response);
            }
        });

        let issued = lock(&self.shared.permission).request_grant(FINE_LOCATION_PERMISSION, handler);
        match issued {
            Ok(()) => debug!(ticket, "permission requested"),
            Err(e) => {
                error!(ticket, error = %e, "permission request could not be issued");
                self.settle(ticket, WorkflowError::PermissionRequestFailed(e).into());
            }
        }
    }

    fn on_permission_response(&self, ticket: u64, response: PermissionResponse) {
        let verdict = response.validate(FINE_LOCATION_PERMISSION);

        let mut cycle = lock(&self.shared.cycle);
        if cycle.phase != (Phase::AwaitingPermission { ticket }) {
            warn!(ticket, "stale permission response ignored");
            return;
        }

        match verdict {
            Ok(GrantResult::Granted) => {
                cycle.phase = Phase::AwaitingFix {
                    ticket,
                    deadline: self.deadline(),
                };
                drop(cycle);
                info!(ticket, "location permission granted");
                self.request_fix(ticket);
            }
            Ok(GrantResult::Denied) => {
                warn!(ticket, "location permission denied");
                self.settle_locked(cycle, ticket, WorkflowError::PermissionDenied.into());
            }
            Err(malformed) => {
                error!(ticket, error = %malformed, ?response, "malformed permission response");
                self.settle_locked(cycle, ticket, WorkflowError::from(malformed).into());
            }
        }
    }

    fn request_fix(&self, ticket: u64) {
        self.shared.host.set_busy(true);

        // The cycle may have timed out while the host was showing the indicator
        let (live, other_busy) = {
            let mut cycle = lock(&self.shared.cycle);
            let live = matches!(
                cycle.phase,
                Phase::AwaitingFix { ticket: current, .. } if current == ticket
            );
            let other_busy = cycle.busy_shown;
            cycle.busy_shown |= live;
            (live, other_busy)
        };

        if !live {
            debug!(ticket, "cycle ended before the fix was requested");
            if !other_busy {
                self.shared.host.set_busy(false);
            }
            return;
        }

        let weak = Arc::downgrade(&self.shared);
        let handler: FixHandler = Box::new(move |outcome: FixOutcome| {
            if let Some(tracker) = Self::from_weak(&weak) {
                tracker.on_fix(ticket, outcome);
            }
        });

        let issued = lock(&self.shared.location).request_single_fix(&self.shared.provider, handler);
        match issued {
            Ok(()) => debug!(ticket, provider = %self.shared.provider, "fix requested"),
            Err(e) => {
                error!(ticket, error = %e, "fix request could not be issued");
                self.settle(ticket, WorkflowError::LocationServiceUnavailable(e).into());
            }
        }
    }

    fn on_fix(&self, ticket: u64, outcome: FixOutcome) {
        {
            let mut cycle = lock(&self.shared.cycle);
            match cycle.phase {
                Phase::AwaitingFix { ticket: current, .. } if current == ticket => {
                    cycle.phase = Phase::Completing { ticket };
                }
                _ => {
                    warn!(ticket, "late fix ignored");
                    return;
                }
            }
        }

        let result = match outcome {
            Ok(position) => self.record_fix(ticket, &position),
            Err(failure) => {
                warn!(ticket, %failure, "fix acquisition failed");
                WorkflowError::AcquisitionFailed(failure).into()
            }
        };

        self.settle(ticket, result);
    }

    /// Compare against the stored fix, then replace it
    fn record_fix(&self, ticket: u64, position: &GeoPosition) -> WorkflowResult {
        let mut store = lock(&self.shared.store);

        let previous = match store.load() {
            Ok(previous) => previous,
            Err(e) => {
                error!(ticket, error = %e, "failed to read stored fix");
                return WorkflowError::PersistenceReadFailed(e).into();
            }
        };

        let result = match previous {
            None => WorkflowResult::FirstFixStored,
            Some(previous) => {
                let meters = self.shared.earth_model.distance_m(&previous, position) as u32;
                debug!(ticket, %previous, current = %position, meters, "distance computed");
                WorkflowResult::DistanceComputed { meters }
            }
        };

        if let Err(e) = store.save(position) {
            error!(ticket, error = %e, ?result, "failed to store fix");
            return WorkflowError::PersistenceWriteFailed(e).into();
        }

        result
    }

    fn settle(&self, ticket: u64, result: WorkflowResult) {
        let cycle = lock(&self.shared.cycle);
        self.settle_locked(cycle, ticket, result);
    }

    /// End cycle `ticket` with `result`, then notify the host without holding the lock
    fn settle_locked(&self, mut cycle: MutexGuard<'_, Cycle>, ticket: u64, result: WorkflowResult) {
        if cycle.phase.ticket() != Some(ticket) {
            warn!(ticket, ?result, "result for a finished cycle dropped");
            return;
        }

        let was_busy = cycle.busy_shown;
        let dialog = Dialog::for_result(&result, &self.shared.formatter);

        match &result {
            WorkflowResult::FirstFixStored => info!(ticket, "first fix stored"),
            WorkflowResult::DistanceComputed { meters } => {
                info!(ticket, meters, display = %self.shared.formatter.format(*meters), "distance reported")
            }
            WorkflowResult::Failed(e) if e.is_internal() => error!(ticket, error = %e, "cycle failed"),
            WorkflowResult::Failed(e) => warn!(ticket, error = %e, "cycle failed"),
        }

        cycle.phase = Phase::Idle;
        cycle.busy_shown = false;
        cycle.completed += 1;
        cycle.last_result = Some(result);
        drop(cycle);

        if was_busy {
            self.shared.host.set_busy(false);
        }
        self.shared.host.show_dialog(dialog);
    }
}
