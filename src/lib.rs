//! Course progression gating and learning analytics.
//!
//! The [`engine::Engine`] answers which lessons and modules a learner may open,
//! builds sidebar status listings, resolves the "Continue" target after a
//! quiz, and rolls quiz results up per course, per student and per team.
//! [`db::Database`] is the SQLite-backed store; [`api`] exposes everything
//! over HTTP.

pub mod analytics;
pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod grading;
pub mod models;
pub mod progression;
pub mod store;
