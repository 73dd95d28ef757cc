//! Provider seams for the identification and fine-tuning pipelines.
//!
//! The service and orchestrator are written against these traits so tests
//! run with deterministic doubles (see `crate::testing`) and providers can
//! be swapped without touching pipeline logic.

pub mod chat;
pub mod finetune;

pub use chat::{ChatApi, Completion};
pub use finetune::{FineTuneApi, JobParams};
