pub mod get;
pub mod list;
pub mod mcp;
pub mod search;
