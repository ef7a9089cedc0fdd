// src/remote/mod.rs
//
// Hosted backend infrastructure: HTTP client for the document store.
// Maps wire concerns (status codes, bodies) to AppError; never touches
// domain entities beyond (de)serializing them.

pub mod client;

pub use client::{Filter, RemoteConfig, RemoteStore, WriteBatch};
