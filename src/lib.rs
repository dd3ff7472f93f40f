//! KFANTRIX: K-pop channel and fandom analytics.
//!
//! The library holds everything that does not draw pixels: typed CSV tables,
//! the load cache, filters, derived metrics, the co-occurrence matrix, view
//! dispatch, formatting and export. The `kfantrix` binary renders it with egui.

pub mod config;
pub mod cooccurrence;
pub mod data;
pub mod export;
pub mod format;
pub mod metrics;
pub mod view;
