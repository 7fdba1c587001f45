use std::future::Future;
use std::time::Duration;

use tokio::time::Timeout;

/// Bounds any future by a wall-clock duration.
pub trait FutureTimeout: Future {
	#[inline(always)]
	fn timeout(self, duration: Duration) -> Timeout<Self>
	where
		Self: Sized,
	{
		tokio::time::timeout(duration, self)
	}
}

impl<F: Future> FutureTimeout for F {}
