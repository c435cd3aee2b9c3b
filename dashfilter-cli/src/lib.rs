//! dashfilter CLI - compile and render dashboard filter trees.
//!
//! This crate provides the `dashfilter` binary, which compiles stored filter
//! trees into wire expressions, renders their summaries, converts them into
//! form state and lists the operators each column type admits.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
