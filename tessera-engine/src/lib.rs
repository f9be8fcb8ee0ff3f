//! Parallel orchestration for Tessera tokenization strategies
//!
//! This crate runs several strategies from `tessera-core` over one shared
//! input on a bounded worker pool. Each strategy gets its own slot in the
//! result; a failure or cancellation in one slot leaves the others intact.
//!
//! # Example
//!
//! ```rust
//! use tessera_engine::{EngineConfig, Orchestrator, StrategyKind};
//!
//! let config = EngineConfig::builder().max_workers(2).build().unwrap();
//! let orchestrator = Orchestrator::new(config).unwrap();
//!
//! let request = orchestrator
//!     .request("na\u{ef}ve".as_bytes())
//!     .strategies([StrategyKind::Word, StrategyKind::Byte])
//!     .build()
//!     .unwrap();
//! let result = orchestrator.run(&request);
//!
//! assert!(result.is_complete());
//! assert_eq!(result.stream(StrategyKind::Byte).unwrap().len(), 6);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod request;
pub mod result;

pub use config::{EngineConfig, EngineConfigBuilder};
pub use error::{EngineError, Result, StrategyError};
pub use orchestrator::Orchestrator;
pub use request::{TokenizationRequest, TokenizationRequestBuilder};
pub use result::{RunMetadata, StrategyOutcome, TokenizationResult};

// Re-export from core for convenience
pub use tessera_core::{
    reconstruct, reconstruct_bytes, CancelToken, StrategyKind, StrategyOptions, Token, TokenStream,
};
