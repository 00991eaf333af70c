//
// Breakout handoff: complete capture in an external, unembedded browsing
// context and reconcile the result back into the session that asked for it.
//
// Two independent ways of observing the same server-held record: bounded
// polling, and a return navigation carrying the session token as a query
// parameter. Both end in the same parse step.

use liftcue_core::{BreakoutSession, BreakoutSessionId, BreakoutStatus, CommandError};
use liftcue_providers::broker::extract_breakout_return;

use crate::engine::{EngineError, VoiceCommandEngine};
use crate::session::SessionState;

impl VoiceCommandEngine {
    pub(crate) async fn run_breakout(&self, attempt: u64) -> Result<SessionState, EngineError> {
        self.enter(attempt, SessionState::Breakout).await?;

        let session = match self
            .broker
            .create_session(self.cfg.return_url.as_deref())
            .await
        {
            Ok(session) => session,
            Err(err) => return self.fail(attempt, err).await,
        };
        log::info!("breakout session {} created", session.session_id.as_str());

        if let Err(err) = self.navigator.open_external(&session.capture_url).await {
            return self.fail(attempt, err).await;
        }

        self.poll_breakout(attempt, session.session_id).await
    }

    /// Poll the broker until the session turns terminal or the attempt
    /// ceiling is hit. Exceeding the ceiling is `session_expired`, never an
    /// unresolved spinner.
    pub(crate) async fn poll_breakout(
        &self,
        attempt: u64,
        id: BreakoutSessionId,
    ) -> Result<SessionState, EngineError> {
        for _ in 0..self.cfg.poll_max_attempts {
            tokio::time::sleep(self.cfg.poll_interval).await;

            {
                let flow = self.inner.lock().await;
                if flow.attempt != attempt {
                    // Dismissed mid-poll; stop quietly.
                    return Err(EngineError::Superseded);
                }
            }

            let session = match self.broker.session_status(&id).await {
                Ok(session) => session,
                Err(err) => return self.fail(attempt, err).await,
            };

            match session.status {
                BreakoutStatus::Pending => continue,
                BreakoutStatus::Completed => {
                    return self.reconcile_completed(attempt, session).await;
                }
                BreakoutStatus::Failed => {
                    return self
                        .fail(
                            attempt,
                            CommandError::CaptureFailed(
                                "external capture reported failure".into(),
                            ),
                        )
                        .await;
                }
                BreakoutStatus::Expired => {
                    return self.fail(attempt, CommandError::SessionExpired).await;
                }
            }
        }

        self.fail(attempt, CommandError::SessionExpired).await
    }

    async fn reconcile_completed(
        &self,
        attempt: u64,
        session: BreakoutSession,
    ) -> Result<SessionState, EngineError> {
        match session.transcript.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => self.parse_text(attempt, text.to_string()).await,
            _ => {
                self.fail(
                    attempt,
                    CommandError::TranscriptionFailed(
                        "breakout completed without a transcript".into(),
                    ),
                )
                .await
            }
        }
    }

    /// Page-load entry point: detect a breakout return in `url`.
    ///
    /// Returns `None` when the URL carries no session token. Otherwise the
    /// token is stripped and the cleaned URL handed back; the host must
    /// restore it before anything else so a refresh cannot replay the
    /// reconciliation. The result is then fetched directly instead of
    /// polled for, except when the upload is still in flight (`pending`),
    /// where bounded polling takes over.
    pub async fn handle_return_navigation(
        &self,
        url: &str,
    ) -> Result<Option<(String, SessionState)>, EngineError> {
        let Some((id, cleaned_url)) = extract_breakout_return(url) else {
            return Ok(None);
        };
        log::info!("breakout return detected for session {}", id.as_str());

        self.dismiss().await;
        let attempt = {
            let mut flow = self.inner.lock().await;
            flow.state = SessionState::Breakout;
            flow.attempt
        };

        let state = match self.broker.session_status(&id).await {
            Err(err) => self.fail(attempt, err).await?,
            Ok(session) => match session.status {
                BreakoutStatus::Completed => self.reconcile_completed(attempt, session).await?,
                BreakoutStatus::Failed => {
                    self.fail(
                        attempt,
                        CommandError::CaptureFailed("external capture reported failure".into()),
                    )
                    .await?
                }
                BreakoutStatus::Expired => {
                    self.fail(attempt, CommandError::SessionExpired).await?
                }
                BreakoutStatus::Pending => self.poll_breakout(attempt, id).await?,
            },
        };

        Ok(Some((cleaned_url, state)))
    }
}
