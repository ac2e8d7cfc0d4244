//! # Stagehand
//!
//! A staged workflow runner for long, expensive, partially-failing
//! infrastructure pipelines: provision, build, install, validate, destroy.
//!
//! Stagehand provides:
//!
//! - **Staged execution**: a caller-declared ordered list of named stages,
//!   run strictly sequentially
//! - **Persisted inter-stage state**: options saved by one stage (or one
//!   process invocation) can be loaded by a later one
//! - **Skip control**: per-stage opt-in skip signals, so expensive stages
//!   can be bypassed on re-runs
//! - **Guaranteed teardown**: exactly one teardown stage that runs after all
//!   others, on success, failure, or cancellation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stagehand::prelude::*;
//!
//! let workflow = WorkflowBuilder::new("aks-install")
//!     .stage_fn("deploy", |ctx| async move {
//!         let options = provision_cluster(ctx.workspace()).await?;
//!         ctx.save_options(&options)?;
//!         Ok(())
//!     })
//!     .stage_fn("validate", |ctx| async move {
//!         let options: ClusterOptions = ctx.load_options()?;
//!         validate_cluster(&options).await
//!     })
//!     .teardown_fn("teardown", |ctx| async move {
//!         let options: ClusterOptions = ctx.load_options()?;
//!         destroy_cluster(&options).await
//!     })
//!     .gate(SkipSignals::from_env())
//!     .build()?;
//!
//! let report = workflow.run(&ctx).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod checks;
pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod gate;
pub mod observability;
pub mod retry;
pub mod stages;
pub mod state;
pub mod testing;
pub mod workspace;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::checks::CountThreshold;
    pub use crate::engine::{Workflow, WorkflowBuilder, WorkflowReport, WorkflowStatus};
    pub use crate::errors::{
        ConfigError, StageError, StateError, WorkflowBuildError, WorkflowError,
    };
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, WorkflowEvent,
    };
    pub use crate::gate::{RunAll, SkipSignals, StageGate};
    pub use crate::retry::{wait_until, WaitOptions};
    pub use crate::stages::{
        FnStage, NoOpStage, Stage, StageContext, StageOutcome, StageRunner, StageStatus,
    };
    pub use crate::state::{
        FileStateStore, InMemoryStateStore, StateStore, StateStoreExt,
    };
    pub use crate::workspace::Workspace;
}

