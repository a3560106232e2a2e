//! Tone analysis and six-post drafting for social media accounts, on top of a
//! chat-completion API.

pub mod cli;
pub mod config;
pub mod errors;
pub mod extract;
pub mod log;
pub mod pipeline;
pub mod posts;
pub mod prompt;
pub mod provider;
pub mod session;
pub mod ux;
pub mod validate;
pub mod wire;

pub use errors::{PipelineError, ShapeError};
pub use pipeline::{Generation, Pipeline};
pub use validate::{validate_platform_url, validate_url};
pub use wire::{GenerationRequest, Platform, PostBatch, PostDraft, ToneProfile, Variant};
