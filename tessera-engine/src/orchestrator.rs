//! Parallel strategy orchestration
//!
//! One rayon task per requested strategy on a pool of fixed size. Each
//! task is isolated: errors and panics end up in that strategy's slot and
//! never reach its siblings.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tessera_core::{verify_stream, CancelToken, StrategyKind, TokenStream, Tokenizer};
use tracing::{debug, debug_span, info, info_span, warn, Span};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result, StrategyError};
use crate::request::{TokenizationRequest, TokenizationRequestBuilder};
use crate::result::{RunMetadata, StrategyOutcome, TokenizationResult};

/// Runs tokenization requests on a bounded worker pool
pub struct Orchestrator {
    config: EngineConfig,
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("workers", &self.pool.current_num_threads())
            .finish()
    }
}

impl Orchestrator {
    /// Create an orchestrator and its worker pool
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_count())
            .thread_name(|i| format!("tessera-worker-{i}"))
            .build()
            .map_err(|e| EngineError::ThreadPool(e.to_string()))?;

        debug!(workers = pool.current_num_threads(), "worker pool ready");
        Ok(Self { config, pool })
    }

    /// Orchestrator with the default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(EngineConfig::default())
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Worker pool size
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Request builder pre-filled with the configured seed and options
    pub fn request(&self, input: &[u8]) -> TokenizationRequestBuilder {
        TokenizationRequest::builder(input)
            .seed(self.config.default_seed)
            .options(self.config.options.clone())
    }

    /// Run every requested strategy
    pub fn run(&self, request: &TokenizationRequest) -> TokenizationResult {
        self.run_with_cancel(request, &CancelToken::new())
    }

    /// Run every requested strategy until done or `cancel` is set
    ///
    /// Strategies that finished before cancellation keep their streams; the
    /// rest report [`StrategyError::Cancelled`]. A configured timeout stops
    /// this request only: `cancel` itself is never set by the orchestrator,
    /// so one token can be shared across requests.
    pub fn run_with_cancel(
        &self,
        request: &TokenizationRequest,
        cancel: &CancelToken,
    ) -> TokenizationResult {
        let span = info_span!(
            "tokenize",
            strategies = request.strategies().len(),
            bytes = request.input().len(),
            seed = request.seed(),
        );
        let _enter = span.enter();
        let started = Instant::now();

        let run_cancel = cancel.child();
        let watchdog = self
            .config
            .timeout()
            .map(|timeout| Watchdog::start(timeout, run_cancel.clone()));

        let outcomes: BTreeMap<StrategyKind, StrategyOutcome> =
            match Tokenizer::with_options(request.seed(), request.options().clone()) {
                Ok(tokenizer) => {
                    let kinds: Vec<StrategyKind> = request.strategies().iter().copied().collect();
                    self.pool.install(|| {
                        kinds
                            .par_iter()
                            .map(|&kind| {
                                let outcome = self.run_strategy(
                                    &span,
                                    &tokenizer,
                                    kind,
                                    request.input(),
                                    &run_cancel,
                                );
                                (kind, outcome)
                            })
                            .collect()
                    })
                }
                Err(err) => {
                    let err = StrategyError::from(err);
                    warn!(error = %err, "request options rejected");
                    request
                        .strategies()
                        .iter()
                        .map(|&kind| (kind, StrategyOutcome::Failed(err.clone())))
                        .collect()
                }
            };

        let fired = watchdog.map(Watchdog::finish).unwrap_or(false);
        let metadata = self.summarize(request, &outcomes, fired, started.elapsed());
        let timed_out = metadata.timed_out;

        if metadata.cancelled > 0 {
            info!(
                cancelled = metadata.cancelled,
                timed_out, "request partially cancelled"
            );
        }
        debug!(
            succeeded = metadata.succeeded,
            failed = metadata.failed,
            elapsed_ms = metadata.elapsed_ms,
            "request finished"
        );

        TokenizationResult::new(outcomes, metadata)
    }

    fn run_strategy(
        &self,
        parent: &Span,
        tokenizer: &Tokenizer,
        kind: StrategyKind,
        input: &[u8],
        cancel: &CancelToken,
    ) -> StrategyOutcome {
        let span = debug_span!(parent: parent, "strategy", strategy = %kind);
        let _enter = span.enter();
        let verify = self.config.verify_round_trip;

        run_isolated(|| {
            let stream = tokenizer.tokenize_with_cancel(kind, input, cancel)?;
            if verify {
                verify_stream(&stream, input)?;
            }
            Ok(stream)
        })
    }

    fn summarize(
        &self,
        request: &TokenizationRequest,
        outcomes: &BTreeMap<StrategyKind, StrategyOutcome>,
        watchdog_fired: bool,
        elapsed: Duration,
    ) -> RunMetadata {
        let mut metadata = RunMetadata {
            workers: self.workers(),
            input_len: request.input().len(),
            seed: request.seed(),
            requested: outcomes.len(),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            ..Default::default()
        };
        for outcome in outcomes.values() {
            match outcome {
                StrategyOutcome::Completed(_) => metadata.succeeded += 1,
                StrategyOutcome::Failed(err) if err.is_cancelled() => metadata.cancelled += 1,
                StrategyOutcome::Failed(_) => metadata.failed += 1,
            }
        }
        // a deadline passing after the last slot finished stopped nothing
        metadata.timed_out = watchdog_fired && metadata.cancelled > 0;
        metadata
    }
}

/// Run one strategy body, turning errors and panics into its slot outcome
fn run_isolated<F>(body: F) -> StrategyOutcome
where
    F: FnOnce() -> std::result::Result<TokenStream, StrategyError>,
{
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(stream)) => {
            debug!(tokens = stream.len(), "strategy completed");
            StrategyOutcome::Completed(stream)
        }
        Ok(Err(StrategyError::Cancelled)) => {
            info!("strategy cancelled");
            StrategyOutcome::Failed(StrategyError::Cancelled)
        }
        Ok(Err(err)) => {
            warn!(error = %err, "strategy failed");
            StrategyOutcome::Failed(err)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(%message, "strategy panicked");
            StrategyOutcome::Failed(StrategyError::Panicked { message })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Background thread that cancels a token once a deadline passes
struct Watchdog {
    stop: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<bool>>,
}

impl Watchdog {
    fn start(timeout: Duration, cancel: CancelToken) -> Self {
        let (stop, stopped) = mpsc::channel::<()>();
        let spawned = thread::Builder::new()
            .name("tessera-watchdog".into())
            .spawn(move || match stopped.recv_timeout(timeout) {
                Err(RecvTimeoutError::Timeout) => {
                    info!(timeout_ms = timeout.as_millis() as u64, "timeout reached, cancelling");
                    cancel.cancel();
                    true
                }
                _ => false,
            });

        let handle = match spawned {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(error = %err, "failed to start watchdog, timeout disabled");
                None
            }
        };
        Self {
            stop: Some(stop),
            handle,
        }
    }

    /// Stop the watchdog; true if it fired
    fn finish(mut self) -> bool {
        self.shutdown()
    }

    fn shutdown(&mut self) -> bool {
        // dropping the sender wakes the thread
        drop(self.stop.take());
        self.handle
            .take()
            .map(|handle| handle.join().unwrap_or(false))
            .unwrap_or(false)
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watchdog_fires_after_timeout() {
        let cancel = CancelToken::new();
        let watchdog = Watchdog::start(Duration::from_millis(10), cancel.clone());
        thread::sleep(Duration::from_millis(200));
        assert!(cancel.is_cancelled());
        assert!(watchdog.finish());
    }

    #[test]
    fn test_watchdog_stopped_early_does_not_cancel() {
        let cancel = CancelToken::new();
        let watchdog = Watchdog::start(Duration::from_secs(60), cancel.clone());
        assert!(!watchdog.finish());
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn test_panic_message() {
        let payload = panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload = panic::catch_unwind(|| panic!("{} {}", "formatted", 1)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "formatted 1");
    }

    fn word_stream(text: &str) -> TokenStream {
        Tokenizer::default()
            .tokenize_str(StrategyKind::Word, text)
            .unwrap()
    }

    #[test]
    fn test_isolated_body_completes() {
        let outcome = run_isolated(|| Ok(word_stream("fine")));
        assert_eq!(outcome.stream(), Some(&word_stream("fine")));
    }

    #[test]
    fn test_isolated_panic_becomes_slot_error() {
        let outcome = run_isolated(|| panic!("strategy exploded"));
        assert_eq!(
            outcome.error(),
            Some(&StrategyError::Panicked {
                message: "strategy exploded".into()
            })
        );
    }

    #[test]
    fn test_isolated_verification_mismatch() {
        let outcome = run_isolated(|| {
            let stream = word_stream("abc");
            verify_stream(&stream, b"abd")?;
            Ok(stream)
        });
        match outcome.error() {
            Some(StrategyError::Mismatch(mismatch)) => {
                assert_eq!(mismatch.strategy, StrategyKind::Word);
                assert_eq!(mismatch.offset, 2);
            }
            other => panic!("expected a mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_isolated_cancellation() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = run_isolated(|| {
            Ok(Tokenizer::default().tokenize_with_cancel(StrategyKind::Char, b"abc", &cancel)?)
        });
        assert_eq!(outcome.error(), Some(&StrategyError::Cancelled));
    }

    #[test]
    fn test_timed_out_requires_a_cancelled_slot() {
        let config = EngineConfig::builder().max_workers(1).build().unwrap();
        let orchestrator = Orchestrator::new(config).unwrap();
        let request = orchestrator
            .request(b"ab")
            .strategies([StrategyKind::Word, StrategyKind::Byte])
            .build()
            .unwrap();

        let mut outcomes = BTreeMap::new();
        outcomes.insert(StrategyKind::Word, StrategyOutcome::Completed(word_stream("ab")));
        outcomes.insert(StrategyKind::Byte, StrategyOutcome::Failed(StrategyError::Cancelled));
        let metadata = orchestrator.summarize(&request, &outcomes, true, Duration::ZERO);
        assert!(metadata.timed_out);
        assert_eq!((metadata.succeeded, metadata.cancelled), (1, 1));

        outcomes.insert(StrategyKind::Byte, StrategyOutcome::Completed(word_stream("ab")));
        let metadata = orchestrator.summarize(&request, &outcomes, true, Duration::ZERO);
        assert!(!metadata.timed_out);
        assert_eq!(metadata.succeeded, 2);
    }

    #[test]
    fn test_pool_size_follows_config() {
        let config = EngineConfig::builder().max_workers(3).build().unwrap();
        let orchestrator = Orchestrator::new(config).unwrap();
        assert_eq!(orchestrator.workers(), 3);
    }

    #[test]
    fn test_request_uses_configured_defaults() {
        let config = EngineConfig::builder().default_seed(77).build().unwrap();
        let orchestrator = Orchestrator::new(config).unwrap();
        let request = orchestrator
            .request(b"abc")
            .strategy(StrategyKind::Char)
            .build()
            .unwrap();
        assert_eq!(request.seed(), 77);
    }
}
