//! View container reconciliation scenarios.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use rstest::rstest;
use serde_json::{Value, json};
use vista_router::{Matcher, NavigateOptions};
use vista_views::{
	ContainerPhase, IntoMarkup, Loader, Markup, ViewError, ViewEventKind, component, params,
};

use common::{ManualAnimator, gated_view, harness, harness_with, text_view};

fn present() -> Matcher {
	Matcher::regex(".+").unwrap()
}

#[rstest]
fn test_match_view_prefers_specific_view() {
	let mut h = harness(&["/{view}/{baz?}"], "/foo/x");
	let foo = h.nav.register_view(text_view("foo"), params([("view", "foo")]));
	let baz = h.nav.register_view(
		text_view("baz"),
		params([("view", Matcher::exact("foo")), ("baz", present())]),
	);

	assert_eq!(h.nav.match_view(&[foo, baz]), Some(baz));
	assert!(!h.nav.is_view_matched(foo));
	assert!(h.nav.is_view_matched(baz));

	h.pool.run_until(h.nav.navigate("/foo", NavigateOptions::push()));
	assert_eq!(h.nav.match_view(&[foo, baz]), Some(foo));
	assert!(h.nav.is_view_matched(foo));
	assert!(!h.nav.is_view_matched(baz));
	assert_eq!(h.nav.match_view_at("/foo/y", &[foo, baz]), Some(baz));
}

#[rstest]
fn test_container_keeps_optional_params_that_is_view_matched_rejects() {
	let mut h = harness(&["/{view}/{baz?}"], "/foo/x");
	let foo = h.nav.register_view(text_view("page-foo"), params([("view", "foo")]));
	let outlet = h.nav.render_view(Value::Null, &[foo]).unwrap();
	let mounted = h.app.mount(&h.body, outlet);
	h.pool.run_until(mounted);

	assert_eq!(h.nav.router().path(), "/foo/x");
	assert!(h.nav.is_view_rendered(foo));
	assert!(!h.nav.is_view_matched(foo));
}

#[rstest]
fn test_render_view_rejects_foreign_handles() {
	let h = harness(&["/{view}"], "/a");
	let other = harness(&["/{view}"], "/a");
	let foreign = other.nav.register_view(text_view("a"), params([("view", "a")]));

	let error = h.nav.render_view(Value::Null, &[foreign]).unwrap_err();
	assert!(matches!(error, ViewError::InvalidArgument(_)));
}

#[rstest]
fn test_mount_renders_matching_view_with_props() {
	let mut h = harness(&["/{view}"], "/a");
	let a = h.nav.register_view(
		Loader::sync(|scope| {
			let title = scope.props()["title"].as_str().unwrap_or_default().to_string();
			Ok(Markup::text(title))
		}),
		params([("view", "a")]),
	);

	let outlet = h.nav.render_view(json!({ "title": "page-a" }), &[a]).unwrap();
	let mounted = h.app.mount(&h.body, outlet);
	h.pool.run_until(mounted);

	assert!(h.body.contains_text("page-a"));
	assert!(h.nav.is_view_rendered(a));
	assert_eq!(
		h.app.root_context().container_states(),
		vec![(ContainerPhase::Mounted, Some(a))]
	);
}

#[rstest]
fn test_latest_navigation_wins_over_slow_loader() {
	let mut h = harness(&["/{view}"], "/a");
	let (slow, open) = gated_view("page-b");
	let a = h.nav.register_view(text_view("page-a"), params([("view", "a")]));
	let b = h.nav.register_view(slow, params([("view", "b")]));
	let c = h.nav.register_view(text_view("page-c"), params([("view", "c")]));
	let outlet = h.nav.render_view(Value::Null, &[a, b, c]).unwrap();
	let mounted = h.app.mount(&h.body, outlet);
	h.pool.run_until(mounted);

	let to_b = h.nav.navigate("/b", NavigateOptions::push());
	h.pool.run_until_stalled();
	assert!(h.body.contains_text("page-a"));
	assert_eq!(
		h.app.root_context().container_states(),
		vec![(ContainerPhase::Loading, Some(a))]
	);

	h.pool.run_until(h.nav.navigate("/c", NavigateOptions::push()));
	// The superseded navigation settles as well.
	h.pool.run_until(to_b);

	let _ = open.send(());
	h.pool.run_until_stalled();
	assert!(h.body.contains_text("page-c"));
	assert!(!h.body.contains_text("page-b"));
	assert!(!h.body.contains_text("page-a"));
	assert!(!h.nav.is_view_rendered(b));
}

#[rstest]
fn test_navigation_waits_for_exit_transition() {
	let animator = ManualAnimator::default();
	let mut h = harness_with(&["/{view}"], "/a", Some(animator.clone()));
	let a = h.nav.register_view(text_view("page-a"), params([("view", "a")]));
	let b = h.nav.register_view(text_view("page-b"), params([("view", "b")]));
	let outlet = h.nav.render_view(Value::Null, &[a, b]).unwrap();
	let mounted = h.app.mount(&h.body, outlet);
	h.pool.run_until(mounted);

	let mut to_b = h.nav.navigate("/b", NavigateOptions::push());
	h.pool.run_until_stalled();
	assert!(h.body.contains_text("page-a"));
	assert!(h.body.contains_text("page-b"));
	assert_eq!(animator.running(), 1);
	assert!((&mut to_b).now_or_never().is_none());
	assert!(h.nav.is_view_rendered(a));

	animator.release_all();
	let result = h.pool.run_until(to_b);
	assert_eq!(result.path, "/b");
	assert!(!h.body.contains_text("page-a"));
	assert!(!h.nav.is_view_rendered(a));
	assert_eq!(animator.entered().len(), 2);
	assert!(animator.entered().iter().all(|e| e.starts_with("page:")));
}

#[rstest]
fn test_unmatched_route_empties_container() {
	let mut h = harness(&["/{view}"], "/a");
	let a = h.nav.register_view(text_view("page-a"), params([("view", "a")]));
	let outlet = h.nav.render_view(Value::Null, &[a]).unwrap();
	let mounted = h.app.mount(&h.body, outlet);
	h.pool.run_until(mounted);

	h.pool.run_until(h.nav.navigate("/elsewhere", NavigateOptions::push()));
	assert!(!h.body.contains_text("page-a"));
	assert_eq!(
		h.app.root_context().container_states(),
		vec![(ContainerPhase::Unmatched, None)]
	);
}

#[rstest]
fn test_default_view_fills_unmatched_container() {
	let mut h = harness(&["/{view}", "/"], "/missing");
	let a = h.nav.register_view(text_view("page-a"), params([("view", "a")]));
	let home = h.nav.register_view(text_view("home"), params([("view", Matcher::absent())]));
	let outlet = h.nav.render_view(Value::Null, &[a]).unwrap().with_default(home);
	let mounted = h.app.mount(&h.body, outlet);
	h.pool.run_until(mounted);

	assert!(h.body.contains_text("home"));
}

#[rstest]
fn test_trailing_slash_redirects_to_canonical_path() {
	let mut h = harness(&["/{view}"], "/foo/?q=1#top");
	let foo = h.nav.register_view(text_view("page-foo"), params([("view", "foo")]));
	let outlet = h.nav.render_view(Value::Null, &[foo]).unwrap();
	let mounted = h.app.mount(&h.body, outlet);
	h.pool.run_until(mounted);

	assert_eq!(h.nav.router().path(), "/foo?q=1#top");
	assert_eq!(h.nav.history().len(), 1);
	assert!(h.body.contains_text("page-foo"));
}

#[rstest]
fn test_nested_container_delays_navigation() {
	let mut h = harness(&["/{view}/{id?}"], "/mail");
	let (slow, open) = gated_view("message-7");
	let message = h.nav.register_view(slow, params([("view", Matcher::exact("mail")), ("id", present())]));
	let mail = h.nav.register_view(
		Loader::sync(move |scope| {
			let inner = scope.navigator().render_view(Value::Null, &[message])?;
			Ok(Markup::element("section")
				.child("mail")
				.child(inner)
				.into_markup())
		}),
		params([("view", "mail")]),
	);
	let outlet = h.nav.render_view(Value::Null, &[mail]).unwrap();
	let mounted = h.app.mount(&h.body, outlet);
	h.pool.run_until(mounted);
	assert!(h.body.contains_text("mail"));
	assert!(!h.body.contains_text("message-7"));

	let mut to_message = h.nav.navigate("/mail/7", NavigateOptions::push());
	h.pool.run_until_stalled();
	assert!((&mut to_message).now_or_never().is_none());

	let _ = open.send(());
	h.pool.run_until(to_message);
	assert!(h.body.contains_text("message-7"));
	assert!(h.nav.is_view_rendered(mail));
	assert!(h.nav.is_view_rendered(message));
}

#[rstest]
fn test_nested_page_enters_after_parent_is_connected() {
	let animator = ManualAnimator::default();
	let mut h = harness_with(&["/{view}/{id?}"], "/mail/7", Some(animator.clone()));
	let message = h.nav.register_view(
		text_view("message-7"),
		params([("view", Matcher::exact("mail")), ("id", present())]),
	);
	let mail = h.nav.register_view(
		Loader::sync(move |scope| {
			let inner = scope.navigator().render_view(Value::Null, &[message])?;
			Ok(Markup::element("section")
				.child("mail")
				.child(inner)
				.into_markup())
		}),
		params([("view", "mail")]),
	);

	let events = Rc::new(RefCell::new(Vec::new()));
	let seen = Rc::clone(&events);
	let body = h.body.clone();
	let _subscription = h.app.root_context().on_event(move |event| {
		if event.kind == ViewEventKind::PageEnter {
			seen.borrow_mut().push((event.view, body.contains_text("message-7")));
		}
	});

	let outlet = h.nav.render_view(Value::Null, &[mail]).unwrap();
	let mounted = h.app.mount(&h.body, outlet);
	h.pool.run_until(mounted);

	assert_eq!(*events.borrow(), vec![(mail, true), (message, true)]);
	assert_eq!(
		animator.entered(),
		vec![
			format!("page:{}", mail.id()),
			format!("page:{}", message.id()),
		]
	);
}

#[rstest]
fn test_leave_precedes_enter() {
	let mut h = harness(&["/{view}"], "/a");
	let a = h.nav.register_view(text_view("page-a"), params([("view", "a")]));
	let b = h.nav.register_view(text_view("page-b"), params([("view", "b")]));
	let events = Rc::new(RefCell::new(Vec::new()));
	let seen = Rc::clone(&events);
	let _subscription = h.app.root_context().on_event(move |event| {
		let name = match event.kind {
			ViewEventKind::PageEnter => "enter",
			ViewEventKind::PageLeave => "leave",
			ViewEventKind::PageError(_) => "error",
		};
		seen.borrow_mut().push((name, event.view));
	});

	let outlet = h.nav.render_view(Value::Null, &[a, b]).unwrap();
	let mounted = h.app.mount(&h.body, outlet);
	h.pool.run_until(mounted);
	h.pool.run_until(h.nav.navigate("/b", NavigateOptions::push()));

	assert_eq!(
		*events.borrow(),
		vec![("enter", a), ("leave", a), ("enter", b)]
	);
}

#[rstest]
#[case(true)]
#[case(false)]
fn test_render_errors_are_contained_by_error_view(#[case] with_error_view: bool) {
	let mut h = harness(&["/{view}"], "/broken");
	let broken = h.nav.register_view(
		Loader::future(|| async { Err(ViewError::ComponentLoad("network down".into())) }),
		params([("view", "broken")]),
	);
	if with_error_view {
		h.nav
			.register_error_view(|error| Markup::text(format!("oops: {error}")));
	}
	let errors = Rc::new(RefCell::new(Vec::new()));
	let seen = Rc::clone(&errors);
	let _subscription = h.app.root_context().on_event(move |event| {
		if let ViewEventKind::PageError(error) = &event.kind {
			seen.borrow_mut().push(error.clone());
		}
	});

	let outlet = h.nav.render_view(Value::Null, &[broken]).unwrap();
	let mounted = h.app.mount(&h.body, outlet);
	h.pool.run_until(mounted);

	if with_error_view {
		assert!(h.body.contains_text("oops: Component load failed: network down"));
		assert!(errors.borrow().is_empty());
	} else {
		assert_eq!(
			*errors.borrow(),
			vec![ViewError::ComponentLoad("network down".into())]
		);
	}
}

#[rstest]
fn test_portal_content_removed_with_view() {
	let mut h = harness(&["/{view}"], "/a");
	let overlay = vista_views::Element::new("overlay");
	let target = overlay.clone();
	let a = h.nav.register_view(
		Loader::sync(move |_| {
			Ok(Markup::Portal {
				target: target.clone(),
				content: Box::new(Markup::text("floating")),
			})
		}),
		params([("view", "a")]),
	);
	let b = h.nav.register_view(text_view("page-b"), params([("view", "b")]));
	let outlet = h.nav.render_view(Value::Null, &[a, b]).unwrap();
	let mounted = h.app.mount(&h.body, outlet);
	h.pool.run_until(mounted);
	assert!(overlay.contains_text("floating"));

	h.pool.run_until(h.nav.navigate("/b", NavigateOptions::push()));
	assert!(!overlay.contains_text("floating"));
}

#[rstest]
fn test_component_helper_builds_sync_loader() {
	let mut h = harness(&["/{view}"], "/a");
	let a = h.nav.register_view(
		Loader::Sync(component(|_| Ok(Markup::text("page-a")))),
		params([("view", "a")]),
	);
	let outlet = h.nav.render_view(Value::Null, &[a]).unwrap();
	let mounted = h.app.mount(&h.body, outlet);
	h.pool.run_until(mounted);
	assert!(h.body.contains_text("page-a"));
}
