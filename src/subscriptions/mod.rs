//! Named-event subscriptions with synchronous dispatch.
//!
//! This module provides the [`Registry`]:
//! - `on` / `once` register callbacks for an event name
//! - `off` removes them again
//! - `emit` invokes every current match, newest first
//!
//! Subscriptions support:
//! - Scoping by an optional [`Identifier`](crate::Identifier)
//! - One-shot delivery
//! - Typed payloads, stored type-erased
//!
//! # Example
//!
//! ```
//! use emitter::{Identifier, Registry};
//!
//! let registry = Registry::new();
//!
//! registry.once("login", |user: &String| println!("welcome {user}"), Identifier::from(42));
//! registry.emit("login", &"bob".to_string(), Identifier::from(42)); // prints
//! registry.emit("login", &"carl".to_string(), Identifier::from(42)); // already removed
//!
//! assert_eq!(registry.subscription_count(), 0);
//! ```

mod registry;
mod types;

pub use registry::Registry;
pub use types::{IdentifierMatching, RegistryConfig};
