//! Page transition animations.

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::dom::Element;

/// Drives entrance and exit transitions of mounted pages.
///
/// `trigger` names the transition (see
/// [`AppConfig::transition_trigger`](crate::AppConfig)).
pub trait Animator {
	/// Starts the entrance transition of a freshly mounted page.
	fn animate_in(&self, element: &Element, trigger: &str);

	/// Runs the exit transition. The page element is removed once the
	/// returned future resolves.
	fn animate_out(&self, element: &Element, trigger: &str) -> LocalBoxFuture<'static, ()>;
}

/// Animator without transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnimator;

impl Animator for NoopAnimator {
	fn animate_in(&self, _element: &Element, _trigger: &str) {}

	fn animate_out(&self, _element: &Element, _trigger: &str) -> LocalBoxFuture<'static, ()> {
		futures::future::ready(()).boxed_local()
	}
}
