//! filebank: OpenAI-compatible file and vector store persistence.
//!
//! This crate is the storage core behind an OpenAI-style Files and Vector
//! Stores API: uploaded file metadata and raw content, vector store records
//! with aggregate file counts and expiration policy, and the membership
//! records linking files into stores.
//!
//! The transport layer (HTTP routing, authentication, body parsing) lives
//! outside this crate; it calls the repository traits in [`db`] and
//! serializes the domain types in [`models`], which carry the OpenAI wire
//! representation via serde.

pub mod config;
pub mod db;
pub mod models;
