//! Integration tests for route matching and path building
//!
//! These tests verify:
//! 1. Paths built from a route state match back to that state
//! 2. Route-driven matcher selection across a route table
//! 3. Navigation keeps history and route signals in step

use proptest::prelude::*;
use rstest::rstest;
use std::cell::RefCell;
use std::rc::Rc;
use vista_history::History;
use vista_router::{
	Matcher, NavigateOptions, RouteInfo, RouteState, Router, best_match, param_matchers,
};

fn segment() -> impl Strategy<Value = String> {
	"[a-zA-Z0-9 _.~-]{1,8}"
}

proptest! {
	#[test]
	fn prop_build_then_match_restores_state(
		view in segment(),
		id in proptest::option::of(segment()),
	) {
		let info = RouteInfo::parse("/app/{view}/{id?}").unwrap();
		let mut state = RouteState::new().with("view", view);
		if let Some(id) = id {
			state.insert("id", id);
		}

		let path = info.build(&state).unwrap();
		prop_assert_eq!(info.match_path(&path), Some(state));
	}
}

#[rstest]
fn test_signals_follow_navigation() {
	let router = Router::new(["/{section}/{item?}", "/"], History::new("/")).unwrap();
	let sections = Rc::new(RefCell::new(Vec::new()));
	let s = Rc::clone(&sections);
	let _sub = router
		.route_signal()
		.subscribe(move |route: &RouteState| s.borrow_mut().push(route.value("section").to_string()));

	let _ = router.navigate("/mail/1", NavigateOptions::push());
	let _ = router.navigate("/mail/1?unread=true", NavigateOptions::push());
	let _ = router.navigate("/contacts", NavigateOptions::push());

	// The query-only change does not re-publish the route.
	assert_eq!(*sections.borrow(), vec!["mail", "contacts"]);
	assert_eq!(router.history().len(), 4);
}

#[rstest]
fn test_route_table_drives_view_selection() {
	let router = Router::new(["/{view}/{baz?}"], History::new("/foo/x")).unwrap();
	let foo = param_matchers([("view", Matcher::exact("foo"))]);
	let baz = param_matchers([
		("view", Matcher::exact("foo")),
		("baz", Matcher::regex(".").unwrap()),
	]);
	let views = [foo, baz];

	let selected = best_match(views.iter(), &router.route()).unwrap();
	assert!(selected.contains_key("baz"));

	let _ = router.navigate("/foo", NavigateOptions::push());
	let selected = best_match(views.iter(), &router.route()).unwrap();
	assert!(!selected.contains_key("baz"));
}

#[rstest]
fn test_unmatched_path_yields_empty_route() {
	let router = Router::new(["/users/{id}"], History::new("/")).unwrap();
	assert!(router.route().is_empty());
	assert!(router.match_path("/users").is_none());
	assert_eq!(router.match_path("/users/7").unwrap().value("id"), "7");
}
