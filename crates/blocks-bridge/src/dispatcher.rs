use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use blocks_threading::{
    cancellation_token::{CancellationToken, TaskTracker},
    ThreadBoundRunner,
};
use serde_json::Value;
use tracing::Instrument;
use url::Url;

use crate::{
    credentials::CredentialStore,
    deep_link::{DeepLinkError, DeepLinkHandler},
    delivery::Delivery,
    executor::{ExecuteError, RequestExecutor},
    message::{InboundMessage, ScriptMessage},
    model::Instruction,
    registry::{AdmitError, InstructionRegistry},
    surface::{Surface, UrlOpener},
    transport::{HttpTransport, ReqwestTransport},
    BridgeSettings,
};

/// What the controller did with a message. Informational only; nothing is reported to the
/// surface.
#[derive(Debug)]
pub enum MessageOutcome {
    /// Wrong channel, unknown shape, or the bridge is shut down.
    Ignored,
    /// An instruction that was malformed or already handled.
    Rejected(AdmitError),
    /// The instruction was admitted and its request is running.
    Executing {
        #[allow(missing_docs)]
        etag: String,
    },
    /// A deep link was rewritten and opened.
    DeepLinkOpened(Url),
    /// A deep link could not be handed off.
    DeepLinkFailed(DeepLinkError),
}

/// Connects one surface to the instruction machinery.
///
/// Messages are accepted from any context. Requests run as tasks on the tokio runtime and their
/// results are delivered back on the surface's own context through its [`ThreadBoundRunner`].
/// Each admitted instruction is handed to its task directly; the registry history is never read
/// to decide what to execute.
pub struct BridgeController<T, S> {
    settings: BridgeSettings,
    registry: Mutex<InstructionRegistry>,
    executor: Arc<RequestExecutor<T>>,
    delivery: Delivery<S>,
    deep_links: DeepLinkHandler,
    tasks: TaskTracker,
    shutdown: CancellationToken,
}

impl<S: Surface> BridgeController<ReqwestTransport, S> {
    /// Create a bridge that performs requests with `reqwest` and the process-wide cookie jar.
    pub fn with_shared_jar(
        settings: BridgeSettings,
        surface: ThreadBoundRunner<S>,
        opener: Arc<dyn UrlOpener>,
    ) -> Result<Self, reqwest::Error> {
        let credentials = CredentialStore::shared();
        let transport = ReqwestTransport::from_settings(&settings, credentials.jar())?;
        let executor = RequestExecutor::new(transport, credentials);
        Ok(Self::new(settings, executor, surface, opener))
    }
}

impl<T, S> BridgeController<T, S>
where
    T: HttpTransport + 'static,
    S: Surface,
{
    #[allow(missing_docs)]
    pub fn new(
        settings: BridgeSettings,
        executor: RequestExecutor<T>,
        surface: ThreadBoundRunner<S>,
        opener: Arc<dyn UrlOpener>,
    ) -> Self {
        let deep_links = DeepLinkHandler::new(opener, settings.deep_link_redirect.clone());
        Self {
            settings,
            registry: Mutex::new(InstructionRegistry::new()),
            executor: Arc::new(executor),
            delivery: Delivery::new(surface),
            deep_links,
            tasks: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Handle a message posted by the surface. Returns without waiting for any network work.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_message(&self, message: ScriptMessage) -> MessageOutcome {
        if message.channel != self.settings.channel_name {
            tracing::trace!(channel = %message.channel, "Ignoring message on foreign channel");
            return MessageOutcome::Ignored;
        }
        if self.shutdown.is_cancelled() {
            tracing::debug!("Ignoring message, bridge is shut down");
            return MessageOutcome::Ignored;
        }

        match InboundMessage::classify(&message.body) {
            InboundMessage::Instruction(payload) => self.handle_instruction(&payload),
            InboundMessage::DeepLink(raw_url) => match self.deep_links.open(&raw_url) {
                Ok(url) => {
                    tracing::info!(%url, "Opened deep link");
                    MessageOutcome::DeepLinkOpened(url)
                }
                Err(e) => {
                    tracing::warn!(url = %raw_url, "Failed to open deep link: {e}");
                    MessageOutcome::DeepLinkFailed(e)
                }
            },
            InboundMessage::Unknown => MessageOutcome::Ignored,
        }
    }

    fn handle_instruction(&self, payload: &Value) -> MessageOutcome {
        let admitted = self.registry().admit(payload);
        match admitted {
            Ok(instruction) => {
                let etag = instruction.etag().to_string();
                self.spawn_execution(instruction);
                MessageOutcome::Executing { etag }
            }
            Err(e) => {
                tracing::debug!("Dropping instruction: {e}");
                MessageOutcome::Rejected(e)
            }
        }
    }

    fn spawn_execution(&self, instruction: Instruction) {
        let executor = self.executor.clone();
        let delivery = self.delivery.clone();
        let cancelled = self.shutdown.child_token();
        let span = tracing::info_span!(
            "instruction",
            etag = %instruction.etag(),
            method = instruction.request.method().as_str(),
            url = %instruction.request.url,
        );

        self.tasks.spawn(
            async move {
                let result = tokio::select! {
                    _ = cancelled.cancelled() => {
                        tracing::debug!("Bridge shut down before the request completed");
                        return;
                    }
                    result = executor.execute(&instruction.request) => result,
                };

                let envelope = match result {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        log_failure(&e);
                        return;
                    }
                };

                let serialized = match serde_json::to_string(&envelope) {
                    Ok(serialized) => serialized,
                    Err(e) => {
                        tracing::error!("Failed to serialize response envelope: {e}");
                        return;
                    }
                };

                match delivery.deliver(serialized).await {
                    Ok(()) => tracing::debug!("Delivered response to surface"),
                    Err(e) if e.is_gone() => {
                        tracing::debug!("Surface gone, dropping response: {e}")
                    }
                    Err(e) => tracing::warn!("Failed to deliver response: {e}"),
                }
            }
            .instrument(span),
        );
    }

    /// Instructions admitted so far, oldest first.
    pub fn history(&self) -> Vec<Instruction> {
        self.registry().history().to_vec()
    }

    /// Wait until every request started so far has finished and its result was delivered or
    /// dropped.
    pub async fn settle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Stop accepting messages, cancel running requests and wait for their tasks to end.
    ///
    /// Results of cancelled requests are dropped.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.tasks.close();
        self.tasks.wait().await;
    }

    fn registry(&self) -> MutexGuard<'_, InstructionRegistry> {
        // Admission cannot leave the registry half-updated, so a poisoned lock is still usable
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T, S> Drop for BridgeController<T, S> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn log_failure(error: &ExecuteError) {
    match error {
        // Known limitation: authentication failures are not reported to the surface, which has
        // to rely on its own timeout.
        ExecuteError::Authentication { status } => {
            tracing::warn!(status, "Instruction request was not authenticated")
        }
        ExecuteError::UnexpectedStatus { status } => {
            tracing::warn!(status, "Instruction request returned an unexpected status")
        }
        ExecuteError::Transport(e) => tracing::error!("Instruction request failed: {e}"),
        ExecuteError::BodyEncoding(e) => tracing::error!("Instruction body not encodable: {e}"),
    }
}
