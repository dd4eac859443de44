//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the storage engines backing the resource API.

pub mod storage;
