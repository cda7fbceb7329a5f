//! Registry of named callbacks and synchronous dispatch.

use crate::error::{EmitterError, Result};
use crate::types::{Delivery, Identifier, SubscriptionId};
use parking_lot::Mutex;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{Callback, RegistryConfig, Subscription};

/// In-process publish/subscribe registry.
///
/// Subscriptions are kept in insertion order. `emit` visits the
/// subscriptions present when it starts, most recent first, and invokes
/// every match synchronously on the caller's thread.
///
/// The internal lock is released while callbacks run, so a callback may
/// subscribe, unsubscribe or emit on the same registry.
pub struct Registry {
    /// Live subscriptions, ordered by ascending id.
    subscriptions: Mutex<Vec<Subscription>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
    config: RegistryConfig,
}

impl Registry {
    /// Create an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with a custom configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            subscriptions: Mutex::new(Vec::with_capacity(config.initial_capacity)),
            next_id: AtomicU64::new(1),
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Subscribe `callback` to every emit of `event`.
    ///
    /// Registering the same callback twice creates two independent
    /// subscriptions that each fire.
    ///
    /// The callback's argument type is the payload type it subscribes to.
    /// Emits carrying any other payload type skip it, including payload-less
    /// emits ([`signal`](Self::signal) sends `&()`):
    ///
    /// ```
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// let registry = emitter::Registry::new();
    /// let calls = Arc::new(AtomicUsize::new(0));
    /// let c = Arc::clone(&calls);
    /// registry.on("x", move |_: &String| { c.fetch_add(1, Ordering::SeqCst); }, None);
    ///
    /// registry.signal("x", None);
    /// assert_eq!(calls.load(Ordering::SeqCst), 0);
    ///
    /// registry.emit("x", &String::from("hi"), None);
    /// assert_eq!(calls.load(Ordering::SeqCst), 1);
    /// ```
    pub fn on<T, F>(
        &self,
        event: impl Into<String>,
        callback: F,
        identifier: impl Into<Option<Identifier>>,
    ) where
        T: Any,
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.register(
            event.into(),
            Callback::new::<T, F>(callback),
            identifier.into(),
            true,
        );
    }

    /// Subscribe `callback` to the next matching emit of `event` only.
    ///
    /// Payload typing works as for [`on`](Self::on); an emit that skips the
    /// callback over a type mismatch does not consume it. Under concurrent
    /// emits the callback still runs at most once.
    pub fn once<T, F>(
        &self,
        event: impl Into<String>,
        callback: F,
        identifier: impl Into<Option<Identifier>>,
    ) where
        T: Any,
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.register(
            event.into(),
            Callback::new::<T, F>(callback),
            identifier.into(),
            false,
        );
    }

    /// Remove every subscription to `event` registered with exactly this
    /// identifier. `None` only removes subscriptions registered without one.
    pub fn off(&self, event: &str, identifier: impl Into<Option<Identifier>>) {
        let identifier = identifier.into();
        let mut subs = self.subscriptions.lock();
        let before = subs.len();
        subs.retain(|sub| !sub.matches_exact(event, identifier.as_ref()));

        tracing::trace!(
            event,
            identifier = ?identifier,
            removed = before - subs.len(),
            "unsubscribed"
        );
    }

    /// Invoke every subscription matching `event` with `payload`.
    ///
    /// With an identifier, only subscriptions carrying that identifier fire
    /// (see [`IdentifierMatching`](crate::IdentifierMatching) for falsy
    /// identifiers). Subscriptions expecting another payload type are skipped.
    ///
    /// A panicking callback unwinds out of `emit`; matches not yet visited
    /// are not invoked.
    pub fn emit<T: Any>(
        &self,
        event: &str,
        payload: &T,
        identifier: impl Into<Option<Identifier>>,
    ) {
        match self.dispatch(event, payload, identifier.into(), false) {
            Ok(_) => {}
            // Lenient dispatch skips mismatches instead of failing.
            Err(err) => tracing::warn!(event, error = %err, "emit failed"),
        }
    }

    /// Emit an event without a payload.
    ///
    /// Reaches subscriptions whose callbacks take `&()`.
    pub fn signal(&self, event: &str, identifier: impl Into<Option<Identifier>>) {
        self.emit(event, &(), identifier);
    }

    /// Like [`emit`](Self::emit), but fails on the first matching
    /// subscription that expects a different payload type.
    ///
    /// Matches visited before the failing one have already been invoked.
    pub fn try_emit<T: Any>(
        &self,
        event: &str,
        payload: &T,
        identifier: impl Into<Option<Identifier>>,
    ) -> Result<Delivery> {
        self.dispatch(event, payload, identifier.into(), true)
    }

    /// Get subscription count.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Number of subscriptions to `event`, regardless of identifier.
    pub fn listener_count(&self, event: &str) -> usize {
        self.subscriptions
            .lock()
            .iter()
            .filter(|sub| sub.event == event)
            .count()
    }

    pub fn has_listeners(&self, event: &str) -> bool {
        self.subscriptions.lock().iter().any(|sub| sub.event == event)
    }

    /// Drop every subscription.
    pub fn clear(&self) {
        let mut subs = self.subscriptions.lock();
        tracing::trace!(removed = subs.len(), "cleared");
        subs.clear();
    }

    fn register(
        &self,
        event: String,
        callback: Callback,
        identifier: Option<Identifier>,
        repeated: bool,
    ) {
        let mut subs = self.subscriptions.lock();
        // Taken under the lock so ids stay sorted in the vector.
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        tracing::trace!(
            event = %event,
            identifier = ?identifier,
            %id,
            repeated,
            "subscribed"
        );

        subs.push(Subscription {
            id,
            event,
            identifier,
            repeated,
            claimed: false,
            callback,
        });
    }

    fn dispatch<T: Any>(
        &self,
        event: &str,
        payload: &T,
        identifier: Option<Identifier>,
        strict: bool,
    ) -> Result<Delivery> {
        let scope = self.config.identifier_matching.scope(identifier);

        // Snapshot matches newest first. Anything subscribed from here on
        // is not part of this emit.
        let targets: Vec<(SubscriptionId, bool, Callback)> = {
            let subs = self.subscriptions.lock();
            subs.iter()
                .rev()
                .filter(|sub| sub.matches_emit(event, scope.as_ref()))
                .map(|sub| (sub.id, sub.repeated, sub.callback.clone()))
                .collect()
        };

        tracing::trace!(event, scope = ?scope, matched = targets.len(), "emit");

        let payload_type = TypeId::of::<T>();
        let mut delivery = Delivery::default();

        for (id, repeated, callback) in targets {
            // Check presence and claim one-shots in one critical section so
            // concurrent emits cannot both run the same one-shot.
            {
                let mut subs = self.subscriptions.lock();
                // Removed since the snapshot, by `off` or another emit.
                let Some(index) = Self::index_of(&subs, id) else {
                    continue;
                };
                if subs[index].claimed {
                    continue;
                }

                if !callback.accepts(payload_type) {
                    if strict {
                        return Err(EmitterError::PayloadMismatch {
                            event: event.to_string(),
                            expected: callback.payload_type_name(),
                            found: type_name::<T>(),
                        });
                    }
                    tracing::debug!(
                        event,
                        %id,
                        expected = callback.payload_type_name(),
                        "skipping subscriber with mismatched payload type"
                    );
                    continue;
                }

                if !repeated {
                    subs[index].claimed = true;
                }
            }

            if repeated {
                callback.invoke(payload as &dyn Any);
                delivery.invoked += 1;
                continue;
            }

            let claim = Claim {
                registry: self,
                id,
                armed: true,
            };
            callback.invoke(payload as &dyn Any);
            delivery.invoked += 1;
            if claim.consume() {
                delivery.removed += 1;
            }
        }

        Ok(delivery)
    }

    fn index_of(subs: &[Subscription], id: SubscriptionId) -> Option<usize> {
        subs.binary_search_by_key(&id, |sub| sub.id).ok()
    }
}

/// A one-shot taken by an in-flight emit.
///
/// Dropped without [`consume`](Self::consume) (the callback unwound), the
/// claim is released and the subscription stays registered.
struct Claim<'a> {
    registry: &'a Registry,
    id: SubscriptionId,
    armed: bool,
}

impl Claim<'_> {
    /// Remove the fired one-shot. False if `off` already removed it.
    fn consume(mut self) -> bool {
        self.armed = false;
        let mut subs = self.registry.subscriptions.lock();
        match Registry::index_of(&subs, self.id) {
            Some(index) => {
                subs.remove(index);
                true
            }
            None => false,
        }
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut subs = self.registry.subscriptions.lock();
        if let Some(index) = Registry::index_of(&subs, self.id) {
            subs[index].claimed = false;
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("subscriptions", &self.subscription_count())
            .field("config", &self.config)
            .finish()
    }
}
