//! Trait definitions for storyloom collaborators.
//!
//! The story engine talks to two outside systems: a repository that persists
//! scenelets and a model client that turns a prompt into JSON text. Both are
//! traits here so the engine can be driven by real backends or test doubles.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod model;
mod repository;

pub use model::{
    JsonGenerationOptions, JsonGenerationRequest, JsonGenerationRequestBuilder, StoryModelClient,
};
pub use repository::SceneletRepository;
