//! waste-route-planner core
//!
//! Client-side route building for waste collection: turns an optimizer
//! result into an editable route draft and persists it as a schedule.

pub mod api;
pub mod draft;
pub mod editor;
pub mod error;
pub mod materialize;
pub mod model;
pub mod planner;
pub mod polyline;
pub mod request;
pub mod schedule;
pub mod traits;
pub mod units;
