//! Test utilities for story engine tests.
//!
//! This module provides a scripted model client, a repository that fails on
//! demand, and response builders.

pub mod failing_repository;
pub mod mock_model;

#[allow(unused_imports)]
pub use failing_repository::FailingRepository;
#[allow(unused_imports)]
pub use mock_model::{
    MockModelClient, MockResponse, branch, concluding, linear, record, scenelet,
};
