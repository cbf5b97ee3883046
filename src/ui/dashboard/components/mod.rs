//! Dashboard component modules
//!
//! Contains all individual rendering components

pub mod agenda;
pub mod audit;
pub mod footer;
pub mod header;
pub mod info_panel;
pub mod logs;
pub mod map;
pub mod overlays;
pub mod record_form;
pub mod search;
pub mod statistics;
pub mod summary;
