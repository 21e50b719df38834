//! MCP server exposing the SDK documentation catalog.
//!
//! [`protocol`] holds the protocol plumbing (JSON-RPC types, tool and resource
//! registration, the stdio loop); [`server`] wires the catalog onto it.

pub mod protocol;
pub mod server;

pub use crate::protocol::{McpError, McpServer};
pub use server::{AppContext, build_server};
