//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tunable transport behavior. Keep this minimal; expand without breaking API.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Whether `stop()` also reconciles every handle against position zero.
    ///
    /// When false, stopping leaves handles in whatever state they had at the
    /// stop instant and only the clock snaps back.
    pub reconcile_on_stop: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reconcile_on_stop: true,
        }
    }
}
