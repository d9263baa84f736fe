//! Review Lens - LLM-assisted authenticity scoring for product reviews
//!
//! This crate scores batches of e-commerce reviews for how likely each one is
//! fake or incentivized, by fanning them out to a chat-completion model and
//! recovering per-review scores from whatever the model sends back.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
