//! Per-entry state maps.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::HistoryError;

/// Key/value store bound to one history entry.
///
/// Cloning a `StateMap` yields another handle to the *same* map; use
/// [`StateMap::deep_clone`] to copy the contents into an independent map.
#[derive(Clone, Default)]
pub struct StateMap {
	inner: Rc<RefCell<BTreeMap<String, Value>>>,
}

impl StateMap {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a clone of the value stored under `key`.
	pub fn get(&self, key: &str) -> Option<Value> {
		self.inner.borrow().get(key).cloned()
	}

	/// Deserializes the value stored under `key`.
	///
	/// Returns `Ok(None)` when the key is absent.
	pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, HistoryError> {
		match self.get(key) {
			Some(value) => serde_json::from_value(value)
				.map(Some)
				.map_err(|source| HistoryError::deserialize(key, source)),
			None => Ok(None),
		}
	}

	/// Returns whether `key` is present.
	pub fn contains_key(&self, key: &str) -> bool {
		self.inner.borrow().contains_key(key)
	}

	/// Stores `value` under `key`, returning the previous value.
	pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
		self.inner.borrow_mut().insert(key.into(), value)
	}

	/// Serializes and stores `value` under `key`.
	pub fn insert_as<T: Serialize>(&self, key: impl Into<String>, value: &T) -> Result<(), HistoryError> {
		let key = key.into();
		let value = serde_json::to_value(value)
			.map_err(|source| HistoryError::serialize(key.as_str(), source))?;
		self.insert(key, value);
		Ok(())
	}

	/// Removes `key`, returning its value.
	pub fn remove(&self, key: &str) -> Option<Value> {
		self.inner.borrow_mut().remove(key)
	}

	/// Number of stored keys.
	pub fn len(&self) -> usize {
		self.inner.borrow().len()
	}

	/// Returns whether no key is stored.
	pub fn is_empty(&self) -> bool {
		self.inner.borrow().is_empty()
	}

	/// Copies the current contents out.
	pub fn to_map(&self) -> BTreeMap<String, Value> {
		self.inner.borrow().clone()
	}

	/// Creates an independent map with the same contents.
	pub fn deep_clone(&self) -> Self {
		Self {
			inner: Rc::new(RefCell::new(self.to_map())),
		}
	}

	/// Returns whether both handles point to the same map.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl fmt::Debug for StateMap {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.inner.borrow().iter()).finish()
	}
}
