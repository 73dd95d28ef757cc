//! Core types: components, requests, training records, and job state.

pub mod component;
pub mod job;
pub mod request;
pub mod training;

pub use component::{Component, ComponentType, ReusePotential};
pub use job::{FineTuneJob, JobSnapshot, JobStatus};
pub use request::{
    IdentifyOptions, IdentifyRequest, IdentifyResult, TokenUsage, DEFAULT_MAX_COMPONENTS,
    DEFAULT_MIN_CONFIDENCE,
};
pub use training::{validate_artifact, ChatTurn, TrainingExample};
