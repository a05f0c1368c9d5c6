//! Ridelens: natural-language SQL chat over ride-share trip data.
//!
//! A loader command populates an embedded libSQL database from three CSV
//! files; a query gateway delegates questions to an external reasoning
//! service that plans and executes SQL against that database; an axum web
//! server exposes a chat UI and JSON API over the gateway.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod llm;
pub mod testing;
pub mod web;
