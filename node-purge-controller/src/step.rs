use std::future::Future;
use std::time::Duration;

use node_purge::BoxError;
use node_purge::StepError;

use super::CancelSignal;

/// Bounds each collaborator call by the step timeout and races it against
/// the cancel signal.
#[derive(Clone, Debug)]
pub(crate) struct Step {
    timeout: Option<Duration>,
    cancel: CancelSignal,
}

impl Step {
    pub(crate) fn new(timeout: Option<Duration>, cancel: CancelSignal) -> Self {
        Self { timeout, cancel }
    }

    pub(crate) fn timeout(self, timeout: Option<Duration>) -> Self {
        Self { timeout, ..self }
    }

    pub(crate) fn cancel_on(self, cancel: CancelSignal) -> Self {
        Self { cancel, ..self }
    }

    /// Same timeout, deaf to cancellation.
    pub(crate) fn uncancellable(&self) -> Self {
        Self::new(self.timeout, CancelSignal::never())
    }

    pub(crate) async fn run<T>(
        &self,
        call: impl Future<Output = Result<T, BoxError>>,
    ) -> Result<T, StepError> {
        let timed = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, call)
                    .await
                    .map_err(|_| StepError::TimedOut(limit))?
                    .map_err(StepError::Api),
                None => call.await.map_err(StepError::Api),
            }
        };
        let mut cancel = self.cancel.clone();
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(StepError::Cancelled),
            result = timed => result,
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::new(None, CancelSignal::never())
    }
}
