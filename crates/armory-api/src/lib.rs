//! Presentation-collaborator stand-in: JSON/HTTP routes over the lifecycle
//! engine and the query service.

pub mod server;
