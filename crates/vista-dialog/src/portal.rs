//! Declarative dialog placement.

use vista_views::{Element, IntoMarkup, Markup};

/// Markup rendering `content` into `target` while the owning view is mounted.
///
/// The content is removed from `target` when the view's page is torn down.
pub fn dialog_portal(target: &Element, content: impl IntoMarkup) -> Markup {
	Markup::Portal {
		target: target.clone(),
		content: Box::new(content.into_markup()),
	}
}
