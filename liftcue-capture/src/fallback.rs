use liftcue_core::{CaptureCapabilities, CommandError, StrategyKind};

/// What to do after a capture strategy failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Start the named strategy, silently.
    Try(StrategyKind),
    /// The user backed out; go back to idle without surfacing anything.
    ReturnToIdle,
    /// Stop cascading and show the error (with a manual-entry path for
    /// capture-class failures).
    Surface,
}

/// Per-attempt fallback policy.
///
/// Capability-class failures walk down the preference chain without telling
/// the user. A user cancellation is terminal. An unknown/technical failure
/// escalates exactly once; a second technical failure in the same attempt
/// surfaces instead of trying yet another mechanism.
#[derive(Debug, Default)]
pub struct FallbackPlanner {
    technical_escalations: u8,
}

impl FallbackPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(
        &mut self,
        failed: StrategyKind,
        error: &CommandError,
        caps: &CaptureCapabilities,
    ) -> Fallback {
        if error.is_user_cancelled() {
            return Fallback::ReturnToIdle;
        }

        if error.is_capability_class() {
            // A policy-level mic denial means the whole embedded context is
            // blocked; the in-page dialog tends to be blocked with it, so go
            // straight to breakout.
            if failed == StrategyKind::LocalRecorder
                && matches!(error, CommandError::PermissionDenied { policy: true })
            {
                return Fallback::Try(StrategyKind::Breakout);
            }
            return match next_usable(failed, caps) {
                Some(kind) => Fallback::Try(kind),
                None => Fallback::Surface,
            };
        }

        // Unknown/technical.
        if self.technical_escalations == 0 {
            self.technical_escalations += 1;
            if let Some(kind) = next_usable(failed, caps) {
                return Fallback::Try(kind);
            }
        }
        Fallback::Surface
    }
}

fn next_usable(after: StrategyKind, caps: &CaptureCapabilities) -> Option<StrategyKind> {
    let order = [
        StrategyKind::StreamingRecognition,
        StrategyKind::LocalRecorder,
        StrategyKind::FileCapture,
        StrategyKind::Breakout,
    ];
    let position = order.iter().position(|k| *k == after)?;
    order[position + 1..]
        .iter()
        .copied()
        .find(|kind| caps.allows(*kind))
}
