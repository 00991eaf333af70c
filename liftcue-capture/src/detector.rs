use std::time::Duration;

use liftcue_core::{CaptureCapabilities, MicPermission};
use tokio::time::Instant;

use crate::host::CaptureHosts;

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// A permission rejection faster than this is a container/frame policy
    /// block, not a user decline.
    pub policy_denial_threshold: Duration,
    /// Upper bound on the probe itself. A probe that cannot answer in time
    /// degrades to the conservative capability set.
    pub probe_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            policy_denial_threshold: Duration::from_millis(50),
            probe_timeout: Duration::from_millis(1500),
        }
    }
}

/// Classifies the host environment into a `CaptureCapabilities` snapshot.
///
/// Runs before the user gesture is consumed, because capture has to start
/// synchronously inside the tap that requested it. The snapshot is good for
/// one attempt; the next attempt must detect again, since permission state
/// can legitimately change in between.
pub struct CapabilityDetector {
    hosts: CaptureHosts,
    cfg: ProbeConfig,
}

impl CapabilityDetector {
    pub fn new(hosts: CaptureHosts, cfg: ProbeConfig) -> Self {
        Self { hosts, cfg }
    }

    pub async fn detect(&self) -> CaptureCapabilities {
        let is_secure_context = self.hosts.environment.is_secure_context();
        let is_embedded_frame = self.hosts.environment.is_embedded_frame();
        let has_file_capture_dialog = self.hosts.file_capture.is_available();

        let has_streaming = is_secure_context && self.hosts.recognition.is_available();
        let has_recorder = is_secure_context && self.hosts.microphone.is_available();

        let mut caps = CaptureCapabilities {
            has_streaming_speech_recognition: has_streaming,
            has_local_recorder: has_recorder,
            has_file_capture_dialog,
            is_secure_context,
            is_embedded_frame,
            microphone_permission: MicPermission::Unknown,
            policy_blocked: false,
            recorder_mime_types: if has_recorder {
                self.hosts.microphone.supported_mime_types()
            } else {
                Vec::new()
            },
        };

        if !has_recorder && !has_streaming {
            return caps;
        }

        let started = Instant::now();
        let probe =
            tokio::time::timeout(self.cfg.probe_timeout, self.hosts.microphone.probe_permission());

        match probe.await {
            Ok(Ok(permission)) => {
                caps.microphone_permission = permission;
            }
            Ok(Err(err)) => {
                caps.microphone_permission = MicPermission::Denied;
                let elapsed = started.elapsed();
                if elapsed < self.cfg.policy_denial_threshold {
                    // Rejected before a prompt could possibly have been
                    // shown: the container blocks the capability outright.
                    log::info!(
                        "permission probe rejected in {:?} ({err}); treating as policy denial",
                        elapsed
                    );
                    caps.policy_blocked = true;
                } else {
                    log::info!("permission probe rejected after {:?}: {err}", elapsed);
                }
            }
            Err(_) => {
                // The probe never answered; don't gamble the user's gesture
                // on a microphone call that may hang the same way.
                log::warn!(
                    "permission probe timed out after {:?}; degrading to file capture only",
                    self.cfg.probe_timeout
                );
                caps.has_streaming_speech_recognition = false;
                caps.has_local_recorder = false;
            }
        }

        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{
        DialogPending, FileCaptureHost, MicStream, MicrophoneHost, RecognitionEvent,
        RecognitionHost,
    };
    use async_trait::async_trait;
    use liftcue_core::{CommandError, StrategyKind};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct Env;

    impl crate::host::EnvironmentHost for Env {
        fn is_secure_context(&self) -> bool {
            true
        }
        fn is_embedded_frame(&self) -> bool {
            true
        }
    }

    struct NoRecognition;

    #[async_trait]
    impl RecognitionHost for NoRecognition {
        fn is_available(&self) -> bool {
            false
        }
        async fn start(
            &self,
        ) -> Result<mpsc::UnboundedReceiver<RecognitionEvent>, CommandError> {
            Err(CommandError::CapabilityUnavailable)
        }
        async fn stop(&self) {}
    }

    enum ProbeBehavior {
        RejectAfter(Duration),
        Grant,
        Hang,
    }

    struct Mic {
        behavior: ProbeBehavior,
    }

    #[async_trait]
    impl MicrophoneHost for Mic {
        fn is_available(&self) -> bool {
            true
        }
        fn supported_mime_types(&self) -> Vec<String> {
            vec!["audio/webm".into()]
        }
        async fn probe_permission(&self) -> Result<MicPermission, CommandError> {
            match &self.behavior {
                ProbeBehavior::Grant => Ok(MicPermission::Granted),
                ProbeBehavior::RejectAfter(delay) => {
                    tokio::time::sleep(*delay).await;
                    Err(CommandError::PermissionDenied { policy: false })
                }
                ProbeBehavior::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
        async fn open(&self, _mime_type: &str) -> Result<Box<dyn MicStream>, CommandError> {
            Err(CommandError::CapabilityUnavailable)
        }
    }

    struct Dialog;

    impl FileCaptureHost for Dialog {
        fn is_available(&self) -> bool {
            true
        }
        fn open_capture_dialog(&self) -> Result<DialogPending, CommandError> {
            Err(CommandError::CapabilityUnavailable)
        }
    }

    fn hosts(behavior: ProbeBehavior) -> CaptureHosts {
        CaptureHosts {
            environment: Arc::new(Env),
            recognition: Arc::new(NoRecognition),
            microphone: Arc::new(Mic { behavior }),
            file_capture: Arc::new(Dialog),
        }
    }

    fn cfg() -> ProbeConfig {
        ProbeConfig {
            policy_denial_threshold: Duration::from_millis(50),
            probe_timeout: Duration::from_millis(200),
        }
    }

    #[tokio::test]
    async fn fast_rejection_is_classified_as_policy_denial() {
        let detector =
            CapabilityDetector::new(hosts(ProbeBehavior::RejectAfter(Duration::from_millis(5))), cfg());
        let caps = detector.detect().await;
        assert!(caps.policy_blocked);
        assert_eq!(caps.microphone_permission, MicPermission::Denied);
        assert_eq!(caps.recommended_strategy(), StrategyKind::FileCapture);
    }

    #[tokio::test]
    async fn slow_rejection_is_a_user_decline() {
        let detector = CapabilityDetector::new(
            hosts(ProbeBehavior::RejectAfter(Duration::from_millis(120))),
            cfg(),
        );
        let caps = detector.detect().await;
        assert!(!caps.policy_blocked);
        assert_eq!(caps.microphone_permission, MicPermission::Denied);
    }

    #[tokio::test]
    async fn granted_probe_keeps_the_recorder_usable() {
        let detector = CapabilityDetector::new(hosts(ProbeBehavior::Grant), cfg());
        let caps = detector.detect().await;
        assert_eq!(caps.microphone_permission, MicPermission::Granted);
        assert_eq!(caps.recommended_strategy(), StrategyKind::LocalRecorder);
        assert_eq!(caps.recorder_mime_types, vec!["audio/webm".to_string()]);
    }

    #[tokio::test]
    async fn hung_probe_degrades_to_file_capture_only() {
        let detector = CapabilityDetector::new(hosts(ProbeBehavior::Hang), cfg());
        let caps = detector.detect().await;
        assert!(!caps.has_local_recorder);
        assert!(!caps.has_streaming_speech_recognition);
        assert_eq!(caps.recommended_strategy(), StrategyKind::FileCapture);
    }
}
