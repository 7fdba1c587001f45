use std::time::Duration;

use super::*;
use tokio::time::timeout;

#[tokio::test]
async fn cancel_wakes_waiters() {
	let (ctx, handler) = Context::new();

	let handle = tokio::spawn(async move {
		let reason = ctx.done().await;
		assert_eq!(reason, CancelReason::Cancel);
	});

	timeout(Duration::from_millis(300), handler.cancel())
		.await
		.expect("task should be cancelled");
	timeout(Duration::from_millis(300), handle)
		.await
		.expect("task should be cancelled")
		.expect("panic in task");
}

#[tokio::test]
async fn timeout_expires() {
	let (ctx, mut handler) = Context::with_timeout(Duration::from_millis(100));

	let handle = tokio::spawn(async move {
		let reason = ctx.done().await;
		assert_eq!(reason, CancelReason::Deadline);
	});

	timeout(Duration::from_millis(300), handle)
		.await
		.expect("task should be cancelled")
		.expect("panic in task");
	timeout(Duration::from_millis(300), handler.done())
		.await
		.expect("all contexts should be dropped");
}

#[tokio::test]
async fn cancel_blocks_while_clone_alive() {
	let (ctx, handler) = Context::new();
	let ctx2 = ctx.clone();

	let handle = tokio::spawn(async move {
		let reason = ctx.done().await;
		assert_eq!(reason, CancelReason::Cancel);
	});

	timeout(Duration::from_millis(300), handler.cancel())
		.await
		.expect_err("cancel should block because a clone exists");
	timeout(Duration::from_millis(300), handle)
		.await
		.expect("task should be cancelled")
		.expect("panic in task");
	timeout(Duration::from_millis(300), ctx2.done())
		.await
		.expect("clone should observe the cancellation");
}

#[test]
fn fmt_reason() {
	assert_eq!(CancelReason::Cancel.to_string(), "Cancel");
	assert_eq!(CancelReason::Deadline.to_string(), "Deadline");
}
