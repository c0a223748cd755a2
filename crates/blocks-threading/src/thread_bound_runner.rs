use std::{future::Future, pin::Pin, rc::Rc};

use thiserror::Error;
use tokio::{sync::mpsc, task::spawn_local};

type BoundCall<ThreadState> =
    Box<dyn FnOnce(Rc<ThreadState>) -> Pin<Box<dyn Future<Output = ()>>> + Send>;

/// Number of calls that may be queued for the owning context before callers wait.
const CALL_QUEUE_CAPACITY: usize = 32;

struct CallRequest<ThreadState> {
    function: BoundCall<ThreadState>,
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum CallError {
    #[error("The owning context is gone, the call was not executed")]
    RunnerGone,

    #[error("The call failed before it could return a value (it probably panicked): {0}")]
    CallFailed(String),
}

/// A runner that keeps a non-`Send`, non-`Sync` state on the context that created it and exposes
/// a `Send + Sync` handle for submitting work against that state.
///
/// The state is moved into a task started with `spawn_local`, so [`ThreadBoundRunner::new`] must
/// be called from inside a [`tokio::task::LocalSet`]. Calls are queued and each one is started on
/// the owning context in submission order. A call that panics does not take the runner down.
///
/// Once the owning context is dropped (for example the `LocalSet` that hosted a web view is torn
/// down) every further call fails with [`CallError::RunnerGone`] instead of being queued.
///
/// # Example
/// ```ignore
/// let runner = ThreadBoundRunner::new(web_view);
///
/// runner
///     .run_in_thread(|view| async move { view.evaluate_script(script) })
///     .await?;
/// ```
pub struct ThreadBoundRunner<ThreadState> {
    call_channel_tx: mpsc::Sender<CallRequest<ThreadState>>,
}

impl<ThreadState> Clone for ThreadBoundRunner<ThreadState> {
    fn clone(&self) -> Self {
        Self {
            call_channel_tx: self.call_channel_tx.clone(),
        }
    }
}

impl<ThreadState> ThreadBoundRunner<ThreadState>
where
    ThreadState: 'static,
{
    /// Pin `state` to the current local context.
    pub fn new(state: ThreadState) -> Self {
        let (call_channel_tx, mut call_channel_rx) =
            mpsc::channel::<CallRequest<ThreadState>>(CALL_QUEUE_CAPACITY);

        spawn_local(async move {
            let state = Rc::new(state);
            while let Some(request) = call_channel_rx.recv().await {
                let state = state.clone();
                spawn_local(async move {
                    (request.function)(state).await;
                });
            }
        });

        ThreadBoundRunner { call_channel_tx }
    }

    /// Whether the owning context has stopped accepting calls.
    pub fn is_closed(&self) -> bool {
        self.call_channel_tx.is_closed()
    }

    /// Run `function` against the bound state on the owning context and return its output.
    pub async fn run_in_thread<F, Fut, Output>(&self, function: F) -> Result<Output, CallError>
    where
        F: FnOnce(Rc<ThreadState>) -> Fut + Send + 'static,
        Fut: Future<Output = Output>,
        Output: Send + 'static,
    {
        let (return_channel_tx, return_channel_rx) = tokio::sync::oneshot::channel();
        let request = CallRequest {
            function: Box::new(|state| {
                Box::pin(async move {
                    let result = function(state).await;
                    if return_channel_tx.send(result).is_err() {
                        log::debug!("Caller stopped waiting before the bound call returned");
                    }
                })
            }),
        };

        self.call_channel_tx
            .send(request)
            .await
            .map_err(|_| CallError::RunnerGone)?;

        return_channel_rx
            .await
            .map_err(|e| CallError::CallFailed(e.to_string()))
    }
}
