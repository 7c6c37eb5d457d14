use std::time::Instant;
use tracing::{error, info};

use super::state::{Action, Applied, SessionState};
use super::Clock;
use crate::error::{GatewayError, SessionResult};
use crate::gateway::ChatGateway;
use crate::topology::{LayoutRng, TurnOutcome};

/// Result of one full request/response turn
#[derive(Debug)]
pub struct TurnReport {
    pub user_message_id: u64,
    pub assistant_message_id: u64,
    pub topology: TurnOutcome,
    /// Set when the gateway failed and the placeholder reply was used.
    pub error: Option<GatewayError>,
}

impl TurnReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Drives a [`SessionState`] against a [`ChatGateway`]
pub struct Dialogue<G, C, R> {
    state: SessionState,
    gateway: G,
    clock: C,
    rng: R,
}

impl<G, C, R> Dialogue<G, C, R>
where
    G: ChatGateway,
    C: Clock,
    R: LayoutRng,
{
    pub fn new(gateway: G, clock: C, rng: R) -> Self {
        Self {
            state: SessionState::new(),
            gateway,
            clock,
            rng,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Apply a non-turn action (selection, notes, focus, deletion)
    pub fn apply(&mut self, action: Action) -> SessionResult<Applied> {
        self.state.apply(action, &self.clock, &mut self.rng)
    }

    /// Send a user message and wait for the reply.
    ///
    /// Gateway failures do not surface as `Err`: the turn completes with the
    /// placeholder reply and the error is returned in the report. Either way
    /// the session is no longer thinking when this returns.
    pub async fn send(&mut self, content: &str) -> SessionResult<TurnReport> {
        let applied = self.apply(Action::Submit {
            content: content.to_string(),
        })?;
        let Applied::TurnStarted {
            user_message_id,
            history,
        } = applied
        else {
            unreachable!("submit always starts a turn");
        };

        let start = Instant::now();
        let result = self.gateway.send(&history).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (action, error) = match result {
            Ok(reply) => {
                info!(
                    user_message_id,
                    latency_ms,
                    is_new_topic = reply.analysis.is_new_topic,
                    "Reply received"
                );
                (Action::ReplyReceived { reply }, None)
            }
            Err(e) => {
                error!(user_message_id, latency_ms, error = %e, "Turn failed");
                (
                    Action::TurnFailed {
                        notice: e.to_string(),
                    },
                    Some(e),
                )
            }
        };

        match self.apply(action)? {
            Applied::TurnCompleted {
                assistant_message_id,
                topology,
            } => Ok(TurnReport {
                user_message_id,
                assistant_message_id,
                topology,
                error,
            }),
            _ => unreachable!("a pending turn always completes"),
        }
    }
}
