//! Subscription records and registry configuration.

use crate::types::{Identifier, SubscriptionId};
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Configuration for a registry.
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// How an identifier passed to `emit` scopes delivery.
    /// Default: [`IdentifierMatching::Truthy`]
    pub identifier_matching: IdentifierMatching,

    /// Subscriptions to reserve room for up front.
    /// Default: 16
    pub initial_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            identifier_matching: IdentifierMatching::default(),
            initial_capacity: 16,
        }
    }
}

/// Scoping policy for identifiers passed to `emit`.
///
/// `off` is unaffected: it always compares identifiers exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdentifierMatching {
    /// A falsy identifier (`0` or `""`) counts as "no identifier", so the
    /// emit reaches every subscription for the event.
    #[default]
    Truthy,
    /// Any supplied identifier, falsy or not, must equal the subscription's.
    Exact,
}

impl IdentifierMatching {
    /// Resolve the identifier given to `emit` into the scope to filter by.
    /// `None` means the emit is unscoped.
    pub fn scope(self, identifier: Option<Identifier>) -> Option<Identifier> {
        match self {
            IdentifierMatching::Truthy => identifier.filter(|id| !id.is_falsy()),
            IdentifierMatching::Exact => identifier,
        }
    }
}

/// Type-erased subscriber callback.
///
/// Cloning shares the same underlying closure.
#[derive(Clone)]
pub(crate) struct Callback {
    f: Arc<dyn Fn(&dyn Any) + Send + Sync>,
    payload_type: TypeId,
    payload_type_name: &'static str,
}

impl Callback {
    pub(crate) fn new<T, F>(f: F) -> Self
    where
        T: Any,
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(move |payload: &dyn Any| {
                let payload = payload.downcast_ref::<T>();
                debug_assert!(payload.is_some(), "payload type is checked before invoke");
                if let Some(payload) = payload {
                    f(payload);
                }
            }),
            payload_type: TypeId::of::<T>(),
            payload_type_name: type_name::<T>(),
        }
    }

    /// Whether this callback takes payloads of the given type.
    pub(crate) fn accepts(&self, payload_type: TypeId) -> bool {
        self.payload_type == payload_type
    }

    pub(crate) fn payload_type_name(&self) -> &'static str {
        self.payload_type_name
    }

    pub(crate) fn invoke(&self, payload: &dyn Any) {
        (self.f)(payload)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("payload_type", &self.payload_type_name)
            .finish_non_exhaustive()
    }
}

/// One registered interest in an event.
#[derive(Debug)]
pub(crate) struct Subscription {
    pub(crate) id: SubscriptionId,
    pub(crate) event: String,
    pub(crate) identifier: Option<Identifier>,
    /// False for one-shot subscriptions.
    pub(crate) repeated: bool,
    /// Set while an emit is running this one-shot's callback. Only touched
    /// with the registry lock held.
    pub(crate) claimed: bool,
    pub(crate) callback: Callback,
}

impl Subscription {
    /// Check if this subscription should receive an emit.
    ///
    /// An unscoped emit matches on the event name alone.
    pub(crate) fn matches_emit(&self, event: &str, scope: Option<&Identifier>) -> bool {
        self.event == event
            && match scope {
                Some(id) => self.identifier.as_ref() == Some(id),
                None => true,
            }
    }

    /// Check if `off` should remove this subscription. Absent matches only absent.
    pub(crate) fn matches_exact(&self, event: &str, identifier: Option<&Identifier>) -> bool {
        self.event == event && self.identifier.as_ref() == identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_subscription(event: &str, identifier: Option<Identifier>) -> Subscription {
        Subscription {
            id: SubscriptionId(1),
            event: event.to_string(),
            identifier,
            repeated: true,
            claimed: false,
            callback: Callback::new(|_: &()| {}),
        }
    }

    #[test]
    fn test_unscoped_emit_matches_any_identifier() {
        let sub = make_subscription("x", Some(Identifier::from("A")));
        assert!(sub.matches_emit("x", None));
        assert!(!sub.matches_emit("y", None));
    }

    #[test]
    fn test_scoped_emit_requires_equal_identifier() {
        let sub = make_subscription("x", Some(Identifier::from("A")));
        assert!(sub.matches_emit("x", Some(&Identifier::from("A"))));
        assert!(!sub.matches_emit("x", Some(&Identifier::from("B"))));

        let unscoped = make_subscription("x", None);
        assert!(!unscoped.matches_emit("x", Some(&Identifier::from("A"))));
    }

    #[test]
    fn test_exact_match_absent_equals_absent() {
        let unscoped = make_subscription("x", None);
        let scoped = make_subscription("x", Some(Identifier::from(1)));

        assert!(unscoped.matches_exact("x", None));
        assert!(!scoped.matches_exact("x", None));
        assert!(scoped.matches_exact("x", Some(&Identifier::from(1))));
    }

    #[test]
    fn test_scope_policies() {
        let zero = Some(Identifier::from(0));
        assert_eq!(IdentifierMatching::Truthy.scope(zero.clone()), None);
        assert_eq!(IdentifierMatching::Exact.scope(zero.clone()), zero);
        assert_eq!(IdentifierMatching::Truthy.scope(Some(Identifier::from(""))), None);
        assert_eq!(
            IdentifierMatching::Truthy.scope(Some(Identifier::from(5))),
            Some(Identifier::from(5))
        );
    }

    #[test]
    fn test_callback_payload_type() {
        let callback = Callback::new(|_: &String| {});
        assert!(callback.accepts(TypeId::of::<String>()));
        assert!(!callback.accepts(TypeId::of::<&str>()));
        assert!(callback.payload_type_name().contains("String"));
    }

    #[test]
    fn test_callback_invoke_downcasts() {
        let seen = Arc::new(std::sync::Mutex::new(String::new()));
        let s = Arc::clone(&seen);
        let callback = Callback::new(move |text: &String| s.lock().unwrap().push_str(text));

        callback.invoke(&String::from("hello") as &dyn Any);
        assert_eq!(*seen.lock().unwrap(), "hello");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "payload type is checked before invoke")]
    fn test_callback_invoke_wrong_type_asserts() {
        let callback = Callback::new(|_: &String| {});
        callback.invoke(&7u32 as &dyn Any);
    }
}
