//! Shared building blocks for the kata services: catalog decoding, starter
//! code, harness synthesis, and the submit/poll protocol against the remote
//! execution service.

pub mod canonical;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod harness;
pub mod judge0;
pub mod metadata;
pub mod starter;
pub mod store;
pub mod testcase;
pub mod types;
