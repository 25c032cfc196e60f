//! Vista Views - route-driven view containers
//!
//! Views are registered with parameter matchers instead of paths. A
//! container rendered with [`Navigator::render_view`] mounts the most
//! specific of its views matching the current route, redirects to the
//! view's canonical path when the current one differs, and keeps pending
//! loads, redirects and exit transitions attached to the navigation in
//! flight.
//!
//! ## Example
//!
//! ```ignore
//! use futures::executor::LocalPool;
//! use vista_views::{App, Element, Loader, Markup, params};
//!
//! let mut pool = LocalPool::new();
//! let app = App::builder()
//!     .routes(["/{view}/{id?}", "/"])
//!     .initial_path("/inbox")
//!     .spawner(pool.spawner())
//!     .build()?;
//! let nav = app.navigator().clone();
//!
//! let inbox = nav.register_view(Loader::sync(|_| Ok(Markup::text("Inbox"))), params([("view", "inbox")]));
//! let root = Element::new("body");
//! let mounted = app.mount(&root, nav.render_view(serde_json::Value::Null, &[inbox])?);
//! pool.run_until(mounted);
//! assert!(root.contains_text("Inbox"));
//! ```

#![warn(missing_docs)]

pub mod animate;
pub mod app;
pub mod config;
pub mod container;
pub mod context;
pub mod dom;
pub mod error;
pub mod hooks;
pub mod markup;
pub mod registry;
pub mod resolve;

pub use animate::{Animator, NoopAnimator};
pub use app::{App, AppBuilder, Navigator, ViewScope};
pub use config::{AppConfig, ConfigError, MAX_REDIRECT_DEPTH};
pub use container::{CONTAINER_TAG, ContainerPhase, PAGE_TAG, VIEW_ATTR};
pub use context::{PageState, ViewContext, ViewEvent, ViewEventKind, WeakViewContext};
pub use dom::Element;
pub use error::ViewError;
pub use markup::{ElementMarkup, IntoMarkup, Markup, RenderView};
pub use registry::{Component, Loader, ViewHandle, ViewRegistry, component, params};
pub use resolve::{LinkTarget, resolve_path};
