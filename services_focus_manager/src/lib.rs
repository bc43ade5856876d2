//! # Focus Manager Service
//!
//! This crate tracks which presentation surface currently has user focus.
//!
//! ## Philosophy
//!
//! - **One slot**: at most one surface is focused at any instant
//! - **Event-driven**: focus changes only when the platform reports focus,
//!   blur, or close for a surface
//! - **No implicit fallback**: when the focused surface blurs or closes, focus
//!   becomes empty until another surface reports focus
//! - **Auditable**: every change is recorded
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A window manager (no Z-order, no geometry)
//! - A focus stack (closing a surface does not re-focus the previous one)

use core_types::SurfaceId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Focus event for audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusEvent {
    /// Focus was granted while no surface had it
    Granted {
        surface_id: SurfaceId,
        timestamp_ns: u64,
    },
    /// Focus moved from one surface to another
    Transferred {
        from_surface_id: SurfaceId,
        to_surface_id: SurfaceId,
        timestamp_ns: u64,
    },
    /// The focused surface blurred
    Cleared {
        surface_id: SurfaceId,
        timestamp_ns: u64,
    },
    /// The focused surface went away
    Released {
        surface_id: SurfaceId,
        timestamp_ns: u64,
    },
}

/// Focus manager
///
/// Holds the single focused surface, if any.
#[derive(Debug)]
pub struct FocusManager {
    /// Currently focused surface
    current: Option<SurfaceId>,
    /// Audit trail of focus events
    audit_trail: Vec<FocusEvent>,
    /// Next timestamp (logical clock)
    next_timestamp: u64,
}

impl FocusManager {
    /// Creates a new focus manager with nothing focused
    pub fn new() -> Self {
        Self {
            current: None,
            audit_trail: Vec::new(),
            next_timestamp: 0,
        }
    }

    /// Gives focus to a surface
    ///
    /// Returns `false` (and records nothing) if the surface already had focus.
    pub fn grant(&mut self, surface_id: SurfaceId) -> bool {
        if self.current == Some(surface_id) {
            return false;
        }

        let timestamp = self.next_timestamp();
        let event = match self.current {
            Some(current) => FocusEvent::Transferred {
                from_surface_id: current,
                to_surface_id: surface_id,
                timestamp_ns: timestamp,
            },
            None => FocusEvent::Granted {
                surface_id,
                timestamp_ns: timestamp,
            },
        };

        debug!(surface = %surface_id, "focus granted");
        self.audit_trail.push(event);
        self.current = Some(surface_id);
        true
    }

    /// Handles a blur for a surface
    ///
    /// Only the focused surface can clear focus; a blur from any other
    /// surface is stale and ignored. Returns whether focus was cleared.
    pub fn blur(&mut self, surface_id: SurfaceId) -> bool {
        if self.current != Some(surface_id) {
            return false;
        }
        let timestamp = self.next_timestamp();
        self.audit_trail.push(FocusEvent::Cleared {
            surface_id,
            timestamp_ns: timestamp,
        });
        self.current = None;
        true
    }

    /// Forgets a surface that no longer exists
    ///
    /// Returns whether the surface had focus.
    pub fn release(&mut self, surface_id: SurfaceId) -> bool {
        if self.current != Some(surface_id) {
            return false;
        }
        let timestamp = self.next_timestamp();
        self.audit_trail.push(FocusEvent::Released {
            surface_id,
            timestamp_ns: timestamp,
        });
        self.current = None;
        true
    }

    /// Returns the focused surface, if any
    pub fn current_focus(&self) -> Option<SurfaceId> {
        self.current
    }

    /// Checks if a surface has focus
    pub fn has_focus(&self, surface_id: SurfaceId) -> bool {
        self.current == Some(surface_id)
    }

    /// Returns the audit trail
    pub fn audit_trail(&self) -> &[FocusEvent] {
        &self.audit_trail
    }

    /// Clears the audit trail (for testing)
    #[cfg(test)]
    pub fn clear_audit_trail(&mut self) {
        self.audit_trail.clear();
    }

    fn next_timestamp(&mut self) -> u64 {
        let ts = self.next_timestamp;
        self.next_timestamp += 1;
        ts
    }
}

impl Default for FocusManager {
    fn default() -> Self {
        Self::new()
    }
}
