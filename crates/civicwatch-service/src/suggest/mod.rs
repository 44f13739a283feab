//! Category suggestion gateway.

pub mod gateway;

pub use gateway::SuggestGateway;
