//! Networking modules for the link-shortening REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` is the single outbound HTTP path (bearer attachment + 401
//! teardown), `api` names the consumed endpoints, `types` defines the wire
//! schema, and `error` classifies failures for the stores.

pub mod api;
pub mod error;
pub mod transport;
pub mod types;
