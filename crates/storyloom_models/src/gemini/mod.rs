//! Google Gemini integration over `gemini-rust`.

mod client;

pub use client::GeminiJsonClient;
