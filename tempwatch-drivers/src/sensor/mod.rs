//! Temperature sensor drivers

pub mod mcp9808;

pub use mcp9808::Mcp9808;
