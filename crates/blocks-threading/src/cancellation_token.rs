//! Cooperative cancellation for work spawned on behalf of a thread-bound owner.

pub use tokio_util::sync::CancellationToken;
pub use tokio_util::task::TaskTracker;
