//! Context hook: use_view_context

use crate::app::ViewScope;
use crate::context::ViewContext;

/// Returns the context node of the view being rendered.
///
/// # Example
///
/// ```ignore
/// let inbox = Loader::sync(|scope| {
///     let context = use_view_context(scope);
///     let _leave = context.on_event(|event| {
///         tracing::debug!(?event, "page event");
///     });
///     Ok(Markup::text("inbox"))
/// });
/// ```
pub fn use_view_context(scope: &ViewScope) -> ViewContext {
	scope.context().clone()
}
