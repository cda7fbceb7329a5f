//! Process-wide default registry.
//!
//! The free functions here forward to one lazily created [`Registry`] that
//! lives for the rest of the process. Construct a [`Registry`] directly for
//! an isolated set of subscriptions.

use crate::subscriptions::Registry;
use crate::types::Identifier;
use std::any::Any;
use std::sync::LazyLock;

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

/// The shared default registry.
pub fn global() -> &'static Registry {
    &GLOBAL
}

/// [`Registry::on`] on the default registry.
pub fn on<T, F>(event: impl Into<String>, callback: F, identifier: impl Into<Option<Identifier>>)
where
    T: Any,
    F: Fn(&T) + Send + Sync + 'static,
{
    GLOBAL.on(event, callback, identifier);
}

/// [`Registry::once`] on the default registry.
pub fn once<T, F>(event: impl Into<String>, callback: F, identifier: impl Into<Option<Identifier>>)
where
    T: Any,
    F: Fn(&T) + Send + Sync + 'static,
{
    GLOBAL.once(event, callback, identifier);
}

/// [`Registry::off`] on the default registry.
pub fn off(event: &str, identifier: impl Into<Option<Identifier>>) {
    GLOBAL.off(event, identifier);
}

/// [`Registry::emit`] on the default registry.
pub fn emit<T: Any>(event: &str, payload: &T, identifier: impl Into<Option<Identifier>>) {
    GLOBAL.emit(event, payload, identifier);
}
