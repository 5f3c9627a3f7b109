//! Client-side marketplace state: the root [`state::AppState`], the
//! [`action::Action`] protocol, and the pure [`reducer::reduce`] function that
//! maps one onto the other.

pub mod action;
pub mod pricing;
pub mod reducer;
pub mod seed;
pub mod selectors;
pub mod state;
pub mod store;

pub use action::Action;
pub use reducer::{reduce, reduce_at};
pub use state::AppState;
pub use store::Store;
