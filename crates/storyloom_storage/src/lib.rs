//! Scenelet persistence backends for storyloom.
//!
//! Two implementations of [`SceneletRepository`](storyloom_interface::SceneletRepository):
//!
//! - [`InMemorySceneletRepository`]: a `Vec` behind an `RwLock`, with an
//!   operation journal for tests
//! - [`FileSceneletRepository`]: one JSON document per scenelet, written with
//!   temp file + rename so every record is replaced atomically
//!
//! # Example
//!
//! ```rust
//! use storyloom_storage::FileSceneletRepository;
//! use storyloom_interface::SceneletRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = FileSceneletRepository::new("/tmp/storyloom")?;
//! let started = repo.has_scenelets_for_story("harbor-mystery").await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod in_memory;

pub use filesystem::FileSceneletRepository;
pub use in_memory::{InMemorySceneletRepository, RepositoryOperation};
