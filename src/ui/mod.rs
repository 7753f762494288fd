//! egui rendering: side/top panels, the view sections of the central panel,
//! and the chart and table helpers they delegate to.

pub mod charts;
pub mod panels;
pub mod tables;
pub mod views;
