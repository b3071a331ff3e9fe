//! Core domain types for the weather dashboard
//!
//! Shared by the proxy and the dashboard controller: unit systems, query
//! shapes, loosely-typed provider reports and the recent-searches list.

pub mod history;
pub mod report;
pub mod types;
pub mod units;

pub use history::*;
pub use report::*;
pub use types::*;
pub use units::*;
