//! Helpers shared by unit tests

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

pub const TICK_MESSAGE: &str = "Updating dashboard data...";

/// Counts tick trace events seen on the current thread
struct TickCaptureLayer {
    events: Arc<AtomicUsize>,
}

struct MessageVisitor(Option<String>);

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0 = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{:?}", value));
        }
    }
}

impl<S> Layer<S> for TickCaptureLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if visitor.0.as_deref() == Some(TICK_MESSAGE) {
            self.events.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Installs a thread-local subscriber that counts tick trace events
///
/// Only sees events from the current thread, so use it with the
/// current-thread test runtime.
pub fn capture_ticks() -> (Arc<AtomicUsize>, DefaultGuard) {
    let events = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(TickCaptureLayer {
        events: events.clone(),
    });
    let guard = tracing::subscriber::set_default(subscriber);
    (events, guard)
}
