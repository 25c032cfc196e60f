//! Dialog admission, dismissal and commit scenarios.

use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::executor::{LocalPool, block_on};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use vista_dialog::{
	Dialog, DialogError, DialogHandle, DialogOptions, DialogQueue, DialogQueueOptions, DialogState,
	create_dialog, dialog_portal,
};
use vista_router::NavigateOptions;
use vista_views::{App, Element, Loader, Markup, params};

fn text_dialog(queue: &DialogQueue, text: &'static str) -> Dialog {
	create_dialog(DialogOptions::new(queue, move |_| Element::text(text)))
}

#[fixture]
fn container() -> Element {
	Element::new("dialogs")
}

#[rstest]
fn test_shared_mode_admits_in_fifo_order(container: Element) {
	let queue = DialogQueue::new(DialogQueueOptions::shared(), container.clone());
	let first = text_dialog(&queue, "first").open();
	let second = text_dialog(&queue, "second").open();
	let third = text_dialog(&queue, "third").open();

	assert_eq!(queue.active_count(), 1);
	assert_eq!(queue.pending_count().get(), 2);
	assert!(container.contains_text("first"));
	assert!(!container.contains_text("second"));

	queue.active()[0].close(Some(json!("ok")));
	assert_eq!(block_on(first), Some(json!("ok")));
	assert_eq!(queue.pending_count().get(), 1);
	assert!(container.contains_text("second"));
	assert!(!container.contains_text("first"));
	// Every dialog renders into the same shared root.
	assert_eq!(container.child_count(), 1);

	queue.active()[0].dismiss();
	assert_eq!(block_on(second), None);
	assert!(container.contains_text("third"));

	queue.active()[0].close(Some(json!(3)));
	assert_eq!(block_on(third), Some(json!(3)));
	assert_eq!(queue.active_count(), 0);
}

#[rstest]
fn test_multiple_mode_honours_concurrency(container: Element) {
	let queue = DialogQueue::new(DialogQueueOptions::multiple(Some(2)), container.clone());
	let _a = text_dialog(&queue, "a").open();
	let b = text_dialog(&queue, "b").open();
	let _c = text_dialog(&queue, "c").open();

	assert_eq!(queue.active_count(), 2);
	assert_eq!(queue.pending_count().get(), 1);
	assert_eq!(container.child_count(), 2);
	assert!(!container.contains_text("c"));

	queue.active()[1].close(Some(Value::Bool(true)));
	assert_eq!(block_on(b), Some(Value::Bool(true)));
	assert_eq!(queue.active_count(), 2);
	assert_eq!(queue.pending_count().get(), 0);
	assert!(container.contains_text("c"));
	assert_eq!(container.child_count(), 2);
}

#[rstest]
fn test_unbounded_multiple_mode_admits_everything(container: Element) {
	let queue = DialogQueue::new(DialogQueueOptions::multiple(None), container.clone());
	let _opened: Vec<_> = (0..5).map(|_| text_dialog(&queue, "x").open()).collect();
	assert_eq!(queue.active_count(), 5);
	assert_eq!(queue.pending_count().get(), 0);
}

#[rstest]
fn test_dismiss_pending_keeps_active(container: Element) {
	let queue = DialogQueue::new(DialogQueueOptions::shared(), container.clone());
	let _active = text_dialog(&queue, "active").open();
	let queued = text_dialog(&queue, "queued").open();

	let counts = Rc::new(RefCell::new(Vec::new()));
	let seen = Rc::clone(&counts);
	let _subscription = queue
		.pending_count()
		.subscribe(move |count| seen.borrow_mut().push(*count));

	queue.dismiss_pending();
	assert_eq!(block_on(queued), None);
	assert_eq!(*counts.borrow(), vec![0]);
	assert_eq!(queue.active_count(), 1);
	assert!(container.contains_text("active"));
}

#[rstest]
#[case(DialogQueueOptions::shared(), Some(json!("forced")))]
#[case(DialogQueueOptions::multiple(None), None)]
fn test_dismiss_all_resolves_active_by_mode(
	container: Element,
	#[case] options: DialogQueueOptions,
	#[case] expected: Option<Value>,
) {
	let queue = DialogQueue::new(options, container.clone());
	let active = text_dialog(&queue, "active").open();
	let handle = queue.active()[0].clone();

	queue.dismiss_all(Some(json!("forced")));
	assert_eq!(block_on(active), expected);
	assert_eq!(handle.state(), DialogState::Closed);
	assert_eq!(queue.active_count(), 0);
	assert!(!container.contains_text("active"));
}

#[rstest]
fn test_dismiss_all_gives_queued_dialogs_nothing(container: Element) {
	let queue = DialogQueue::new(DialogQueueOptions::shared(), container);
	let active = text_dialog(&queue, "active").open();
	let queued = text_dialog(&queue, "queued").open();

	queue.dismiss_all(Some(json!(1)));
	assert_eq!(block_on(active), Some(json!(1)));
	assert_eq!(block_on(queued), None);
	assert_eq!(queue.pending_count().get(), 0);
}

#[rstest]
fn test_commit_rejection_keeps_dialog_open(container: Element) {
	let mut pool = LocalPool::new();
	let gate: Rc<RefCell<Option<oneshot::Receiver<()>>>> = Rc::default();
	let hook_gate = Rc::clone(&gate);
	let queue = DialogQueue::new(DialogQueueOptions::shared(), container);
	let dialog = create_dialog(
		DialogOptions::new(&queue, |_| Element::text("name?")).on_commit(move |value| {
			let wait = hook_gate.borrow_mut().take();
			async move {
				if let Some(wait) = wait {
					let _ = wait.await;
				}
				match value.as_str() {
					Some(name) if !name.is_empty() => Ok(()),
					_ => Err(DialogError::Rejected("name required".into())),
				}
			}
		}),
	);
	let result = dialog.open();
	let handle: DialogHandle = queue.active()[0].clone();

	let (release, wait) = oneshot::channel();
	*gate.borrow_mut() = Some(wait);
	let mut rejected = handle.commit(json!(""));
	assert!((&mut rejected).now_or_never().is_none());
	assert_eq!(handle.busy().get(), 1);

	let _ = release.send(());
	assert_eq!(
		pool.run_until(rejected),
		Err(DialogError::Rejected("name required".into()))
	);
	assert_eq!(handle.busy().get(), 0);
	assert!(handle.is_open());

	assert_eq!(pool.run_until(handle.commit(json!("ada"))), Ok(()));
	assert_eq!(pool.run_until(result), Some(json!("ada")));
	assert_eq!(pool.run_until(handle.commit(json!("again"))), Err(DialogError::Closed));
}

#[rstest]
fn test_dialog_portal_follows_view_lifetime() {
	let mut pool = LocalPool::new();
	let app = App::builder()
		.routes(["/{view}"])
		.initial_path("/edit")
		.spawner(pool.spawner())
		.build()
		.unwrap();
	let nav = app.navigator().clone();
	let overlay = Element::new("overlay");
	let target = overlay.clone();
	let edit = nav.register_view(
		Loader::sync(move |_| Ok(dialog_portal(&target, "confirm discard"))),
		params([("view", "edit")]),
	);
	let done = nav.register_view(
		Loader::sync(|_| Ok(Markup::text("done"))),
		params([("view", "done")]),
	);

	let body = Element::new("body");
	let outlet = nav.render_view(Value::Null, &[edit, done]).unwrap();
	pool.run_until(app.mount(&body, outlet));
	assert!(overlay.contains_text("confirm discard"));
	assert!(!body.contains_text("confirm discard"));

	pool.run_until(nav.navigate("/done", NavigateOptions::push()));
	assert!(!overlay.contains_text("confirm discard"));
	assert!(body.contains_text("done"));
}
