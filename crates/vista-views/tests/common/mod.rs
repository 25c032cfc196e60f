//! Shared fixtures for view container tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::future::LocalBoxFuture;
use vista_views::{Animator, App, Element, Loader, Markup, Navigator, component};

pub struct Harness {
	pub pool: LocalPool,
	pub app: App,
	pub nav: Navigator,
	pub body: Element,
}

pub fn harness(routes: &[&str], initial: &str) -> Harness {
	harness_with(routes, initial, None)
}

pub fn harness_with(routes: &[&str], initial: &str, animator: Option<ManualAnimator>) -> Harness {
	let pool = LocalPool::new();
	let mut builder = App::builder()
		.routes(routes.iter().copied())
		.initial_path(initial)
		.spawner(pool.spawner());
	if let Some(animator) = animator {
		builder = builder.animator(animator);
	}
	let app = builder.build().unwrap();
	let nav = app.navigator().clone();
	Harness {
		pool,
		app,
		nav,
		body: Element::new("body"),
	}
}

pub fn text_view(text: &'static str) -> Loader {
	Loader::sync(move |_| Ok(Markup::text(text)))
}

/// An async loader that resolves once the returned sender fires or is dropped.
pub fn gated_view(text: &'static str) -> (Loader, oneshot::Sender<()>) {
	let (open, gate) = oneshot::channel::<()>();
	let gate = Rc::new(RefCell::new(Some(gate)));
	let loader = Loader::future(move || {
		let gate = gate.borrow_mut().take();
		async move {
			if let Some(gate) = gate {
				let _ = gate.await;
			}
			Ok(component(move |_| Ok(Markup::text(text))))
		}
	});
	(loader, open)
}

/// Animator whose exit transitions finish only when released.
#[derive(Clone, Default)]
pub struct ManualAnimator {
	outros: Rc<RefCell<Vec<oneshot::Sender<()>>>>,
	entered: Rc<RefCell<Vec<String>>>,
}

impl ManualAnimator {
	pub fn release_all(&self) {
		for outro in self.outros.borrow_mut().drain(..) {
			let _ = outro.send(());
		}
	}

	pub fn running(&self) -> usize {
		self.outros.borrow().len()
	}

	pub fn entered(&self) -> Vec<String> {
		self.entered.borrow().clone()
	}
}

impl Animator for ManualAnimator {
	fn animate_in(&self, element: &Element, trigger: &str) {
		let view = element.attr(vista_views::VIEW_ATTR).unwrap_or_default();
		self.entered.borrow_mut().push(format!("{trigger}:{view}"));
	}

	fn animate_out(&self, _element: &Element, _trigger: &str) -> LocalBoxFuture<'static, ()> {
		let (done, finished) = oneshot::channel::<()>();
		self.outros.borrow_mut().push(done);
		async move {
			let _ = finished.await;
		}
		.boxed_local()
	}
}
