//! Cancellation that arrives while a request is running
//!
//! Kept in its own test binary: it installs a global subscriber that
//! cancels the request as soon as the first strategy reports completion.

use std::fmt;
use std::sync::OnceLock;

use tessera_engine::*;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::Registry;

static CALLER: OnceLock<CancelToken> = OnceLock::new();

struct CancelOnFirstCompletion;

#[derive(Default)]
struct CompletionVisitor {
    completed: bool,
}

impl Visit for CompletionVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" && format!("{value:?}") == "strategy completed" {
            self.completed = true;
        }
    }
}

impl<S: Subscriber> Layer<S> for CancelOnFirstCompletion {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = CompletionVisitor::default();
        event.record(&mut visitor);
        if visitor.completed {
            if let Some(token) = CALLER.get() {
                token.cancel();
            }
        }
    }
}

#[test]
fn test_cancel_mid_run_keeps_finished_slot() {
    tracing::subscriber::set_global_default(Registry::default().with(CancelOnFirstCompletion))
        .unwrap();
    let caller = CALLER.get_or_init(CancelToken::new);

    let config = EngineConfig::builder().max_workers(1).build().unwrap();
    let orchestrator = Orchestrator::new(config).unwrap();
    let text = "Only the first strategy gets to finish.";
    let request = orchestrator
        .request(text.as_bytes())
        .all_strategies()
        .build()
        .unwrap();

    let result = orchestrator.run_with_cancel(&request, caller);

    let metadata = result.metadata();
    assert_eq!(metadata.succeeded, 1);
    assert_eq!(metadata.cancelled, 8);
    assert_eq!(metadata.failed, 0);
    assert!(!metadata.timed_out);

    let (kind, stream) = result
        .iter()
        .find_map(|(kind, outcome)| outcome.stream().map(|s| (kind, s)))
        .unwrap();
    assert_eq!(reconstruct(stream).unwrap(), text, "{kind}");
    for (other, outcome) in result.iter().filter(|(k, _)| *k != kind) {
        assert_eq!(outcome.error(), Some(&StrategyError::Cancelled), "{other}");
    }
}
