//! Essayist: Outline-to-Essay Writing
//!
//! Turns a hierarchical outline into flowing prose, one section or one batch
//! of sections at a time. Every request is grounded in the text already
//! written and the points still to come, so the essay reads as one piece.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod generation;
pub mod logging;
pub mod orchestrator;
pub mod outline;
pub mod progress;
pub mod prompt;
pub mod provider;
pub mod settings;
