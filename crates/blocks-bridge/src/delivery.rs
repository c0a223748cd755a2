use blocks_threading::{CallError, ThreadBoundRunner};
use thiserror::Error;

use crate::surface::{delivery_script, Surface, SurfaceError};

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error("Surface context unavailable: {0}")]
    Context(#[from] CallError),
}

impl DeliveryError {
    /// The surface went away before the result arrived. Such deliveries are dropped, not queued.
    pub fn is_gone(&self) -> bool {
        matches!(
            self,
            DeliveryError::Surface(SurfaceError::Detached)
                | DeliveryError::Context(CallError::RunnerGone)
        )
    }
}

/// Posts serialized results into the surface, on the context that owns it.
pub struct Delivery<S> {
    surface: ThreadBoundRunner<S>,
}

impl<S> Clone for Delivery<S> {
    fn clone(&self) -> Self {
        Self {
            surface: self.surface.clone(),
        }
    }
}

impl<S: Surface> Delivery<S> {
    #[allow(missing_docs)]
    pub fn new(surface: ThreadBoundRunner<S>) -> Self {
        Self { surface }
    }

    /// Re-enter the surface context and post `serialized` as a `SUPPLEMENTAL_INFORMATION`
    /// message.
    pub async fn deliver(&self, serialized: String) -> Result<(), DeliveryError> {
        let script = delivery_script(&serialized);
        self.surface
            .run_in_thread(move |surface| async move {
                if !surface.is_attached() {
                    return Err(SurfaceError::Detached);
                }
                surface.evaluate_script(&script)
            })
            .await??;
        Ok(())
    }
}
