//! Pluggable services the analyzers call out to.

pub mod planner;

pub use planner::{PlaceholderPlanner, PlannedAlternative, RoutePlanner};
