//! Hooks for components.
//!
//! Hooks read and write route-derived state on behalf of the view being
//! rendered. They take the component's [`ViewScope`](crate::ViewScope), tie
//! their subscriptions to the view's context and become inert once the view
//! is no longer active.

mod query_param;
mod route_param;
mod route_state;
mod view_context;

pub use query_param::{QueryParamHandle, use_query_param};
pub use route_param::use_route_param;
pub use route_state::{RouteStateHandle, use_route_state};
pub use view_context::use_view_context;
