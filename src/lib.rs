//! Dashboard for the RAIS microelectronics labor-market series.
//!
//! [`data`] turns the source spreadsheets into period-indexed tables and is
//! usable on its own; [`app`], [`state`] and [`ui`] are the egui front end.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
