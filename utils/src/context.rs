use std::fmt::{Display, Formatter};
use std::sync::Arc;

use tokio::sync::{broadcast, oneshot};
use tokio::time::Instant;

struct RawContext {
	_sender: oneshot::Sender<()>,
	deadline: Option<Instant>,
	cancel_receiver: broadcast::Receiver<()>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CancelReason {
	Deadline,
	Cancel,
}

impl Display for CancelReason {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Deadline => write!(f, "Deadline"),
			Self::Cancel => write!(f, "Cancel"),
		}
	}
}

/// The owning side of a [`Context`].
///
/// Dropping the handler's cancel sender wakes every clone of the context,
/// and [`Handler::cancel`] then waits until all of those clones are dropped.
pub struct Handler {
	recv: oneshot::Receiver<()>,
	cancel_sender: broadcast::Sender<()>,
}

impl Handler {
	/// Resolves once every clone of the context has been dropped.
	pub async fn done(&mut self) {
		let _ = (&mut self.recv).await;
	}

	/// Cancels the context and waits for every clone to be dropped.
	pub async fn cancel(self) {
		drop(self.cancel_sender);

		let _ = self.recv.await;
	}
}

/// A cheap, cloneable cancellation token shared by every task of the
/// process.
#[derive(Clone)]
pub struct Context(Arc<RawContext>);

impl Context {
	#[must_use]
	pub fn new() -> (Self, Handler) {
		Self::build(None)
	}

	#[must_use]
	pub fn with_timeout(timeout: std::time::Duration) -> (Self, Handler) {
		Self::build(Some(Instant::now() + timeout))
	}

	fn build(deadline: Option<Instant>) -> (Self, Handler) {
		let (sender, recv) = oneshot::channel();
		let (cancel_sender, cancel_receiver) = broadcast::channel(1);

		(
			Self(Arc::new(RawContext {
				_sender: sender,
				deadline,
				cancel_receiver,
			})),
			Handler { recv, cancel_sender },
		)
	}

	pub async fn done(&self) -> CancelReason {
		let mut recv = self.0.cancel_receiver.resubscribe();

		match self.0.deadline {
			Some(deadline) => {
				tokio::select! {
					_ = tokio::time::sleep_until(deadline) => CancelReason::Deadline,
					_ = recv.recv() => CancelReason::Cancel,
				}
			}
			None => {
				let _ = recv.recv().await;
				CancelReason::Cancel
			}
		}
	}
}

#[cfg(test)]
mod tests;
