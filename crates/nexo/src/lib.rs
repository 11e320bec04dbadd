//! nexo - PDF archival pipeline for NEXO AV business documents.
//!
//! Core library: typed RPC boundary, render model, PDF renderer and the
//! batch archiver that drives invoices and quotes into durable storage.

pub mod archive;
pub mod config;
pub mod models;
pub mod render;
pub mod rpc;
pub mod utils;
