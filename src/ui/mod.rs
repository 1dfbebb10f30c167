//! Widgets and charts, split by screen region.

pub mod panels;
pub mod plot;
