//! Domain logic over the loaded tables.
//!
//! Route geometry is combined once at load time; coverage analysis and
//! alternative-route lookup run per request against read-only tables.

pub mod alternatives;
pub mod combine;
pub mod coverage;
pub mod stats;
pub mod utility;

pub use alternatives::find_alternatives;
pub use coverage::analyze_coverage;
