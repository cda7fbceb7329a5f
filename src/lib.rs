//! # Emitter
//!
//! A minimal in-process publish/subscribe registry.
//!
//! ## Core Concepts
//!
//! - **Events**: Callbacks are registered against an event name
//! - **Identifiers**: An optional secondary key scoping a subscription
//! - **One-shot**: `once` subscriptions remove themselves after firing
//! - **Dispatch**: `emit` runs matching callbacks synchronously, newest first
//!
//! ## Example
//!
//! ```
//! use emitter::Identifier;
//!
//! emitter::on("resize", |size: &(u32, u32)| println!("{size:?}"), None);
//! emitter::on("resize", |_: &(u32, u32)| println!("panel 7"), Identifier::from(7));
//!
//! // Both fire.
//! emitter::emit("resize", &(800u32, 600u32), None);
//! // Only the panel 7 subscriber fires.
//! emitter::emit("resize", &(800u32, 600u32), Identifier::from(7));
//!
//! emitter::off("resize", None);
//! emitter::off("resize", Identifier::from(7));
//! ```

pub mod error;
pub mod global;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use error::{EmitterError, Result};
pub use global::{emit, global, off, on, once};
pub use subscriptions::{IdentifierMatching, Registry, RegistryConfig};
pub use types::*;
