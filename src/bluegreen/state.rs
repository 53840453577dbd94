// ABOUTME: Cutover state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce the switch step order at compile time.

/// Sides determined, nothing changed yet.
/// Available actions: `deploy()`, `skip_deploy()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Planned;

/// Next side's services are on the new task definitions.
/// Available actions: `attach_next()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Deployed;

/// Next group attached to the primary tier, not yet confirmed.
/// Available actions: `wait_in_service()`
#[derive(Debug, Clone, Copy, Default)]
pub struct NextAttached;

/// Next group confirmed serving on the primary tier.
/// Available actions: `detach_current()`
#[derive(Debug, Clone, Copy, Default)]
pub struct NextInService;

/// Current group no longer on the primary tier.
/// Available actions: `release_next_standby()`
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentDetached;

/// Next group no longer on the standby tier.
/// Available actions: `attach_current_standby()`
#[derive(Debug, Clone, Copy, Default)]
pub struct NextReleased;

/// Old live group parked on standby.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Completed;
