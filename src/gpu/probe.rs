//! Lazy capability probing for optional native hooks.
//!
//! Some hosts expose native GPU-annotation entry points (PIX-style markers)
//! that have to be located at runtime. The probe runs at most once: the
//! tri-state below keeps "not yet tried" distinct from "tried and failed",
//! and a failed probe is never retried. The first probe is expected to
//! happen before worker threads are spawned, or under external
//! synchronization.

/// Result of probing for an optional native capability.
#[derive(Debug, Default)]
pub enum ProbeState<T> {
    #[default]
    NotProbed,
    Available(T),
    Unavailable,
}

/// One-shot, idempotent holder for a lazily probed capability.
#[derive(Debug, Default)]
pub struct CapabilityProbe<T> {
    state: ProbeState<T>,
}

impl<T> CapabilityProbe<T> {
    pub fn new() -> Self {
        Self {
            state: ProbeState::NotProbed,
        }
    }

    /// Run `loader` on the first call and remember the outcome. Later calls
    /// return the remembered value without invoking `loader` again.
    pub fn get_or_probe(&mut self, loader: impl FnOnce() -> Option<T>) -> Option<&T> {
        if matches!(self.state, ProbeState::NotProbed) {
            self.state = match loader() {
                Some(value) => ProbeState::Available(value),
                None => ProbeState::Unavailable,
            };
        }
        match &self.state {
            ProbeState::Available(value) => Some(value),
            _ => None,
        }
    }

    pub fn state(&self) -> &ProbeState<T> {
        &self.state
    }
}

/// Function table for native debug-marker entry points. Backends call these
/// when available and fall back to no-ops when not.
#[derive(Debug, Clone, Copy)]
pub struct MarkerHooks {
    pub begin_event: fn(&str),
    pub set_marker: fn(&str),
    pub end_event: fn(),
}

/// Host-supplied loader locating the native marker entry points, if any.
pub type MarkerLoader = fn() -> Option<MarkerHooks>;
