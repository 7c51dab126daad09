//! Language-model client implementations for repliq.
//!
//! The only production backend is [`OpenAiCompatModel`], which covers the
//! vast majority of hosted endpoints. Tests use in-crate mocks against the
//! `Model` trait instead.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatModel;
