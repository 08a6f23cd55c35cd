//! Module lifecycle states.

use std::fmt;

/// Where a module is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModuleStatus {
    /// `init` succeeded; not yet processing.
    Initializing,

    /// Processing normally.
    Running,

    /// Processing, but with reduced functionality.
    Degraded {
        /// What is degraded and why.
        reason: String,
    },

    /// Not running. The state modules are constructed in.
    #[default]
    Stopped,

    /// Failed in a way that needs intervention.
    Error {
        /// What went wrong.
        message: String,
    },
}

impl ModuleStatus {
    /// Running with full functionality.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Doing useful work, possibly degraded.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        matches!(self, Self::Running | Self::Degraded { .. })
    }

    /// Not running at all.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => f.write_str("initializing"),
            Self::Running => f.write_str("running"),
            Self::Degraded { reason } => write!(f, "degraded: {reason}"),
            Self::Stopped => f.write_str("stopped"),
            Self::Error { message } => write!(f, "error: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_predicates() {
        assert!(ModuleStatus::Running.is_healthy());
        assert!(ModuleStatus::Running.is_operational());
        assert!(!ModuleStatus::Stopped.is_operational());
        assert!(ModuleStatus::Stopped.is_stopped());

        let degraded = ModuleStatus::Degraded {
            reason: "buffer full".to_string(),
        };
        assert!(!degraded.is_healthy());
        assert!(degraded.is_operational());
    }

    #[test]
    fn test_default_is_stopped() {
        assert_eq!(ModuleStatus::default(), ModuleStatus::Stopped);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ModuleStatus::Running.to_string(), "running");
        let err = ModuleStatus::Error {
            message: "bind failed".to_string(),
        };
        assert_eq!(err.to_string(), "error: bind failed");
    }
}
