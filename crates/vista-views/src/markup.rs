//! Declarative markup returned by components.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::dom::Element;
use crate::registry::ViewHandle;

/// Renderable content produced by a component.
#[derive(Debug, Clone)]
pub enum Markup {
	/// Renders nothing.
	Empty,
	/// A text node.
	Text(Cow<'static, str>),
	/// An element with attributes and children.
	Element(ElementMarkup),
	/// Several siblings without a wrapper element.
	Fragment(Vec<Markup>),
	/// A view container choosing among registered views.
	Views(RenderView),
	/// Content rendered into another element for as long as the owning view
	/// is mounted.
	Portal {
		/// Element receiving the content.
		target: Element,
		/// The content.
		content: Box<Markup>,
	},
}

impl Markup {
	/// A text node.
	pub fn text(content: impl Into<Cow<'static, str>>) -> Self {
		Self::Text(content.into())
	}

	/// Starts an element.
	pub fn element(tag: impl Into<Cow<'static, str>>) -> ElementMarkup {
		ElementMarkup::new(tag)
	}

	/// A fragment of several markups.
	pub fn fragment<I, M>(children: I) -> Self
	where
		I: IntoIterator<Item = M>,
		M: IntoMarkup,
	{
		Self::Fragment(children.into_iter().map(IntoMarkup::into_markup).collect())
	}
}

/// An element in a markup tree.
#[derive(Debug, Clone)]
pub struct ElementMarkup {
	tag: Cow<'static, str>,
	attrs: Vec<(Cow<'static, str>, Cow<'static, str>)>,
	children: Vec<Markup>,
}

impl ElementMarkup {
	/// Creates an element markup.
	pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
		Self {
			tag: tag.into(),
			attrs: Vec::new(),
			children: Vec::new(),
		}
	}

	/// Adds an attribute.
	pub fn attr(
		mut self,
		name: impl Into<Cow<'static, str>>,
		value: impl Into<Cow<'static, str>>,
	) -> Self {
		self.attrs.push((name.into(), value.into()));
		self
	}

	/// Adds a child.
	pub fn child(mut self, child: impl IntoMarkup) -> Self {
		self.children.push(child.into_markup());
		self
	}

	/// Tag name.
	pub fn tag(&self) -> &str {
		&self.tag
	}

	pub(crate) fn into_parts(self) -> (Element, Vec<Markup>) {
		let element = Element::new(self.tag.into_owned());
		for (name, value) in self.attrs {
			element.set_attr(name.into_owned(), value.into_owned());
		}
		(element, self.children)
	}
}

/// A view container in markup form.
///
/// Created with [`Navigator::render_view`](crate::Navigator::render_view),
/// which rejects unregistered views.
#[derive(Clone)]
pub struct RenderView {
	pub(crate) views: Vec<ViewHandle>,
	pub(crate) default_view: Option<ViewHandle>,
	pub(crate) props: Rc<Value>,
}

impl RenderView {
	/// Views the container chooses from.
	pub fn views(&self) -> &[ViewHandle] {
		&self.views
	}

	/// Sets the view rendered when no candidate matches.
	pub fn with_default(mut self, view: ViewHandle) -> Self {
		self.default_view = Some(view);
		self
	}

	/// Props handed to the mounted view.
	pub fn props(&self) -> &Value {
		&self.props
	}
}

impl fmt::Debug for RenderView {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RenderView")
			.field("views", &self.views)
			.field("default_view", &self.default_view)
			.finish()
	}
}

/// Conversion into [`Markup`].
pub trait IntoMarkup {
	/// Performs the conversion.
	fn into_markup(self) -> Markup;
}

impl IntoMarkup for Markup {
	fn into_markup(self) -> Markup {
		self
	}
}

impl IntoMarkup for ElementMarkup {
	fn into_markup(self) -> Markup {
		Markup::Element(self)
	}
}

impl IntoMarkup for RenderView {
	fn into_markup(self) -> Markup {
		Markup::Views(self)
	}
}

impl IntoMarkup for &'static str {
	fn into_markup(self) -> Markup {
		Markup::Text(Cow::Borrowed(self))
	}
}

impl IntoMarkup for String {
	fn into_markup(self) -> Markup {
		Markup::Text(Cow::Owned(self))
	}
}

impl From<ElementMarkup> for Markup {
	fn from(element: ElementMarkup) -> Self {
		Markup::Element(element)
	}
}

impl From<RenderView> for Markup {
	fn from(view: RenderView) -> Self {
		Markup::Views(view)
	}
}
