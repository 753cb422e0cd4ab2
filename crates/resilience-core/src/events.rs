//! Event system shared by every resilience component.
//!
//! Mirrors the pattern used across the workspace's per-component crates: a small
//! `ResilienceEvent` trait, a `Vec`-backed `EventListeners<E>` registry, and a
//! convenience `FnListener` so callers can register closures instead of writing a
//! full `EventListener` impl.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Trait for events emitted by resilience components (circuit breaker transitions,
/// compliance vetoes, feed poll completions, ...).
pub trait ResilienceEvent: Send + Sync + fmt::Debug {
    /// Short machine-readable event kind, e.g. `"state_transition"`.
    fn event_type(&self) -> &'static str;

    /// When the event occurred.
    fn timestamp(&self) -> Instant;

    /// The component instance that emitted this event (a source id, stream id,
    /// job id, or similar).
    fn subject(&self) -> &str;
}

/// Trait for listening to resilience events of a given type.
pub trait EventListener<E: ResilienceEvent>: Send + Sync {
    fn on_event(&self, event: &E);
}

type BoxedEventListener<E> = Arc<dyn EventListener<E>>;

/// A collection of event listeners for one event type.
#[derive(Clone)]
pub struct EventListeners<E: ResilienceEvent> {
    listeners: Vec<BoxedEventListener<E>>,
}

impl<E: ResilienceEvent> EventListeners<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Emits an event to every registered listener. A panicking listener is
    /// caught so the remaining listeners still run; the event itself is never
    /// allowed to unwind into component state machines.
    pub fn emit(&self, event: &E) {
        for listener in &self.listeners {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_event(event);
            }));

            if result.is_err() {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    event_type = event.event_type(),
                    subject = event.subject(),
                    "event listener panicked"
                );
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: ResilienceEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// A function-based event listener, so callers can register closures:
///
/// ```
/// use resilience_core::events::{EventListeners, FnListener, ResilienceEvent};
/// use std::time::Instant;
///
/// #[derive(Debug)]
/// struct Ping;
/// impl ResilienceEvent for Ping {
///     fn event_type(&self) -> &'static str { "ping" }
///     fn timestamp(&self) -> Instant { Instant::now() }
///     fn subject(&self) -> &str { "ping" }
/// }
///
/// let mut listeners: EventListeners<Ping> = EventListeners::new();
/// listeners.add(FnListener::new(|_: &Ping| {}));
/// listeners.emit(&Ping);
/// ```
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _phantom: std::marker::PhantomData<E>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: ResilienceEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event);
    }
}
