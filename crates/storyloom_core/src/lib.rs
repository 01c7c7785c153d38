//! Core data types for storyloom.
//!
//! A story is a tree of scenelets. Each scenelet is one narrative beat: a
//! description, some dialogue, and shot suggestions for the downstream
//! storyboard stages. Scenelets are either linear (one continuation), branch
//! points (two or more labeled choices) or terminal (the path ends there).
//!
//! This crate holds the schema, the validator that turns raw model JSON into a
//! [`ScriptwriterScenelet`], and the task types exchanged between the resume
//! planner and the generation engine.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod record;
mod scenelet;
mod task;

pub use record::{NewScenelet, NewSceneletBuilder, SceneletId, SceneletRecord};
pub use scenelet::{DialogueLine, ScriptwriterScenelet, clone_scenelet, validate_scenelet};
pub use task::{GenerationTask, InterruptedBranch, ResumeState};
