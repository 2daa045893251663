//! In-memory session state.

mod store;

pub use store::{SessionHandle, SessionStore};
