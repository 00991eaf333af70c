use std::sync::Arc;

use async_trait::async_trait;
use liftcue_core::{CaptureResult, CommandError, StrategyKind};

use crate::host::{DialogPending, FileCaptureHost};
use crate::strategy::CaptureStrategy;

/// Strategy 3: the host's native audio-capture chooser.
///
/// The dialog open is the first thing `start` does, with no await in front
/// of it; anything asynchronous before that call would fall outside the
/// user's gesture window and the dialog would silently fail to open on
/// mobile hosts.
pub struct FileCaptureStrategy {
    host: Arc<dyn FileCaptureHost>,
    pending: Option<DialogPending>,
}

impl FileCaptureStrategy {
    pub fn new(host: Arc<dyn FileCaptureHost>) -> Self {
        Self {
            host,
            pending: None,
        }
    }
}

#[async_trait]
impl CaptureStrategy for FileCaptureStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FileCapture
    }

    async fn start(&mut self) -> Result<(), CommandError> {
        self.pending = Some(self.host.open_capture_dialog()?);
        Ok(())
    }

    async fn finish(&mut self) -> Result<CaptureResult, CommandError> {
        let Some(pending) = self.pending.take() else {
            return Err(CommandError::CaptureFailed(
                "capture dialog was never opened".into(),
            ));
        };

        match pending.resolve().await? {
            // Dismissing the chooser is not an error; it must not cascade.
            None => Err(CommandError::UserCancelled),
            Some(audio) => CaptureResult::audio(audio.blob, audio.mime_type, audio.duration_hint),
        }
    }

    async fn abort(&mut self) {
        // Dropping the handle detaches from the dialog; late resolutions go
        // nowhere.
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordedAudio;
    use tokio::sync::oneshot;

    struct ScriptedDialog {
        outcome: std::sync::Mutex<Option<Result<Option<RecordedAudio>, CommandError>>>,
    }

    impl ScriptedDialog {
        fn new(outcome: Result<Option<RecordedAudio>, CommandError>) -> Self {
            Self {
                outcome: std::sync::Mutex::new(Some(outcome)),
            }
        }
    }

    impl FileCaptureHost for ScriptedDialog {
        fn is_available(&self) -> bool {
            true
        }

        fn open_capture_dialog(&self) -> Result<DialogPending, CommandError> {
            let (tx, rx) = oneshot::channel();
            let outcome = self
                .outcome
                .lock()
                .unwrap()
                .take()
                .expect("dialog opened twice");
            let _ = tx.send(outcome);
            Ok(DialogPending::new(rx))
        }
    }

    #[tokio::test]
    async fn resolves_picked_audio() {
        let mut strategy = FileCaptureStrategy::new(Arc::new(ScriptedDialog::new(Ok(Some(
            RecordedAudio {
                blob: vec![7; 64],
                mime_type: "audio/mp4".into(),
                duration_hint: Some(3.0),
            },
        )))));

        strategy.start().await.unwrap();
        let result = strategy.finish().await.unwrap();
        assert!(matches!(result, CaptureResult::Audio { .. }));
    }

    #[tokio::test]
    async fn user_dismissal_is_user_cancelled_not_a_technical_failure() {
        let mut strategy = FileCaptureStrategy::new(Arc::new(ScriptedDialog::new(Ok(None))));
        strategy.start().await.unwrap();
        assert_eq!(
            strategy.finish().await.unwrap_err(),
            CommandError::UserCancelled
        );
    }

    #[tokio::test]
    async fn host_failure_passes_through() {
        let mut strategy = FileCaptureStrategy::new(Arc::new(ScriptedDialog::new(Err(
            CommandError::CaptureFailed("chooser crashed".into()),
        ))));
        strategy.start().await.unwrap();
        assert_eq!(
            strategy.finish().await.unwrap_err(),
            CommandError::CaptureFailed("chooser crashed".into())
        );
    }

    #[tokio::test]
    async fn abandoned_dialog_surfaces_a_capture_failure() {
        struct DroppingDialog;
        impl FileCaptureHost for DroppingDialog {
            fn is_available(&self) -> bool {
                true
            }
            fn open_capture_dialog(&self) -> Result<DialogPending, CommandError> {
                let (_tx, rx) = oneshot::channel();
                Ok(DialogPending::new(rx))
            }
        }

        let mut strategy = FileCaptureStrategy::new(Arc::new(DroppingDialog));
        strategy.start().await.unwrap();
        assert!(matches!(
            strategy.finish().await.unwrap_err(),
            CommandError::CaptureFailed(_)
        ));
    }
}
