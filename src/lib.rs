//! UBO Sync Library
//!
//! This library maps a marketplace shop's UBO (ultimate beneficial owner)
//! additional fields to shareholder contacts for the payment platform, keeps
//! the shop/slot → shareholder code mapping consistent across runs, and
//! classifies uploaded identity documents by UBO slot.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `data`: Data access layer.
//! - `integrations`: External service integrations.
//! - `obs`: Observability and logging.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `db_storage`: PostgreSQL shareholder mapping store.
//! - `memory_store`: In-process shareholder mapping store.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `mirakl_client`: Marketplace operator API client.
//! - `models`: Marketplace and payment platform data models.
//! - `ubo`: UBO extraction and document classification.
//! - `ubo_keys`: UBO field code schema.

pub mod api;
pub mod core;
pub mod data;
pub mod integrations;
pub mod obs;

pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod memory_store;
pub mod mirakl_client;
pub mod models;
pub mod ubo;
pub mod ubo_keys;
