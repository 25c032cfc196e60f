//! In-memory element tree.
//!
//! Containers render into [`Element`]s. The tree is deliberately small: tags,
//! attributes, text nodes and parent/child links, which is what mounting,
//! unmounting and test queries need.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

const TEXT_TAG: &str = "#text";

struct ElementInner {
	tag: String,
	attrs: RefCell<BTreeMap<String, String>>,
	text: RefCell<String>,
	children: RefCell<Vec<Element>>,
	parent: RefCell<Weak<ElementInner>>,
}

/// A node of the element tree.
///
/// Cloning yields another handle to the same node.
#[derive(Clone)]
pub struct Element {
	inner: Rc<ElementInner>,
}

impl Element {
	/// Creates a detached element.
	pub fn new(tag: impl Into<String>) -> Self {
		Self::with_text(tag.into(), String::new())
	}

	/// Creates a detached text node.
	pub fn text(content: impl Into<String>) -> Self {
		Self::with_text(TEXT_TAG.to_string(), content.into())
	}

	fn with_text(tag: String, text: String) -> Self {
		Self {
			inner: Rc::new(ElementInner {
				tag,
				attrs: RefCell::new(BTreeMap::new()),
				text: RefCell::new(text),
				children: RefCell::new(Vec::new()),
				parent: RefCell::new(Weak::new()),
			}),
		}
	}

	/// Tag name; `#text` for text nodes.
	pub fn tag(&self) -> &str {
		&self.inner.tag
	}

	/// Whether this is a text node.
	pub fn is_text(&self) -> bool {
		self.inner.tag == TEXT_TAG
	}

	/// Sets an attribute.
	pub fn set_attr(&self, name: impl Into<String>, value: impl Into<String>) {
		self.inner
			.attrs
			.borrow_mut()
			.insert(name.into(), value.into());
	}

	/// Returns an attribute value.
	pub fn attr(&self, name: &str) -> Option<String> {
		self.inner.attrs.borrow().get(name).cloned()
	}

	/// Replaces the text of a text node.
	pub fn set_text(&self, content: impl Into<String>) {
		*self.inner.text.borrow_mut() = content.into();
	}

	/// Appends `child`, detaching it from its previous parent first.
	pub fn append_child(&self, child: &Element) {
		child.remove();
		*child.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
		self.inner.children.borrow_mut().push(child.clone());
	}

	/// Detaches the node from its parent. No-op when detached.
	pub fn remove(&self) {
		let parent = self.inner.parent.replace(Weak::new()).upgrade();
		if let Some(parent) = parent {
			parent
				.children
				.borrow_mut()
				.retain(|c| !Rc::ptr_eq(&c.inner, &self.inner));
		}
	}

	/// The parent node, if attached.
	pub fn parent(&self) -> Option<Element> {
		self.inner
			.parent
			.borrow()
			.upgrade()
			.map(|inner| Element { inner })
	}

	/// A snapshot of the child list.
	pub fn children(&self) -> Vec<Element> {
		self.inner.children.borrow().clone()
	}

	/// Number of direct children.
	pub fn child_count(&self) -> usize {
		self.inner.children.borrow().len()
	}

	/// Concatenated text of this node and its descendants.
	pub fn text_content(&self) -> String {
		let mut out = String::new();
		self.collect_text(&mut out);
		out
	}

	fn collect_text(&self, out: &mut String) {
		out.push_str(&self.inner.text.borrow());
		for child in self.children() {
			child.collect_text(out);
		}
	}

	/// Whether `needle` occurs in [`Element::text_content`].
	pub fn contains_text(&self, needle: &str) -> bool {
		self.text_content().contains(needle)
	}

	/// Depth-first search for the first descendant satisfying `predicate`.
	pub fn find<F>(&self, predicate: F) -> Option<Element>
	where
		F: Fn(&Element) -> bool,
	{
		self.find_inner(&predicate)
	}

	fn find_inner(&self, predicate: &dyn Fn(&Element) -> bool) -> Option<Element> {
		for child in self.children() {
			if predicate(&child) {
				return Some(child);
			}
			if let Some(found) = child.find_inner(predicate) {
				return Some(found);
			}
		}
		None
	}

	/// First descendant whose attribute `name` equals `value`.
	pub fn find_by_attr(&self, name: &str, value: &str) -> Option<Element> {
		self.find(|e| e.attr(name).as_deref() == Some(value))
	}

	/// Whether `self` is `other` or one of its descendants.
	pub fn is_within(&self, other: &Element) -> bool {
		let mut node = Some(self.clone());
		while let Some(current) = node {
			if current.ptr_eq(other) {
				return true;
			}
			node = current.parent();
		}
		false
	}

	/// Returns whether both handles refer to the same node.
	pub fn ptr_eq(&self, other: &Element) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl fmt::Debug for Element {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_text() {
			return f
				.debug_tuple("Text")
				.field(&*self.inner.text.borrow())
				.finish();
		}
		f.debug_struct("Element")
			.field("tag", &self.inner.tag)
			.field("attrs", &*self.inner.attrs.borrow())
			.field("children", &*self.inner.children.borrow())
			.finish()
	}
}
