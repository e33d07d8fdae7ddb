//! CareLink MCP Server Library
//!
//! A Model Context Protocol (MCP) server for the CareLink EMR. Lets an LLM
//! agent search patients, review visit history, and document home health
//! visit notes; backed by an in-memory mock dataset until the live API is
//! available.

pub mod config;
pub mod emr;
pub mod error;
pub mod logging;
pub mod mcp;

pub use config::Config;
pub use error::{EmrError, Result};
