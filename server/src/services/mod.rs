//! Services behind the GraphQL endpoint.
//!
//! ARCHITECTURE
//! ============
//! Service modules own caller verification, provider calls and resolver
//! logic so route handlers stay focused on protocol translation.

pub mod caller;
pub mod google;
pub mod resolver;
