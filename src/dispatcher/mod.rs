use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::common::error::SelectorError;
use crate::common::types::MemberId;
use crate::selection_method::SelectionStrategy;
use crate::selector::{MemberSelector, SelectorState};

pub type BoxError = Box<dyn StdError + Send + Sync>;

pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(1);

/// Why a single attempt against one member did not succeed.
#[derive(Debug, Error)]
pub enum AttemptFailure {
    #[error("attempt failed: {0}")]
    Failed(#[source] BoxError),
    #[error("attempt timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Every candidate of the pass was tried without success.
    #[error("failover exhausted after {attempts} attempt(s)")]
    Exhausted {
        attempts: usize,
        last_failure: Option<AttemptFailure>,
    },
    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// Drives a [`MemberSelector`] to route one logical request, failing over
/// from member to member until an attempt succeeds or the pass runs dry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    attempt_timeout: Duration,
    fresh_pass_per_request: bool,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPT_TIMEOUT)
    }
}

impl Dispatcher {
    pub fn new(attempt_timeout: Duration) -> Self {
        Self {
            attempt_timeout,
            fresh_pass_per_request: false,
        }
    }

    /// Restart the selector for every request instead of continuing a pass
    /// left over from the previous one.
    pub fn fresh_pass_per_request(mut self, fresh: bool) -> Self {
        self.fresh_pass_per_request = fresh;
        self
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Runs `attempt` against successive candidates until one succeeds.
    ///
    /// Each attempt is bounded by the attempt timeout; the timer is dropped
    /// as soon as the attempt settles. Candidates left after a success are
    /// abandoned.
    #[tracing::instrument(name = "Dispatch request", skip_all, err(Display))]
    pub async fn dispatch<S, F, Fut, T, E>(
        &self,
        selector: &mut MemberSelector<S>,
        mut attempt: F,
    ) -> Result<T, DispatchError>
    where
        S: SelectionStrategy,
        F: FnMut(MemberId) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        if self.fresh_pass_per_request || selector.state() == SelectorState::Complete {
            selector.reset();
        }

        let mut attempts = 0;
        let mut last_failure = None;

        loop {
            let member = match selector.next() {
                Ok(member) => member,
                Err(SelectorError::ExhaustedSelection) => {
                    return Err(DispatchError::Exhausted {
                        attempts,
                        last_failure,
                    })
                }
                Err(e) => return Err(e.into()),
            };
            attempts += 1;

            match tokio::time::timeout(self.attempt_timeout, attempt(member.clone())).await {
                Ok(Ok(response)) => {
                    debug!(%member, attempts, "request succeeded");
                    return Ok(response);
                }
                Ok(Err(e)) => {
                    let failure = AttemptFailure::Failed(e.into());
                    warn!(%member, error = %failure, "attempt failed, trying next member");
                    last_failure = Some(failure);
                }
                Err(_) => {
                    let failure = AttemptFailure::TimedOut(self.attempt_timeout);
                    warn!(%member, error = %failure, "attempt timed out, trying next member");
                    last_failure = Some(failure);
                }
            }
        }
    }
}
