//! notion-mcp - publish workspace files to Notion
//!
//! This crate provides:
//! - A workspace scanner for documentation and source files
//! - A Notion client that turns files into pages of paragraph blocks
//! - An MCP server over stdio exposing scan, sync and status tools
//! - CLI commands mirroring the tools, plus an editor setup wizard

pub mod commands;
pub mod config;
pub mod error;
pub mod mcp;
pub mod notion;
pub mod progress;
pub mod scan;

pub use config::Config;
pub use error::{Error, Result};
