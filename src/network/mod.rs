//! Road network model.
//!
//! A [`Network`] is an ordered list of [`Segment`]s, each with a finite
//! [`SpeedDomain`] and a [`Danger`] classification, plus a symmetric
//! adjacency relation. Networks are validated once at build time and are
//! read-only afterwards.

mod graph;
mod risk;
mod segment;

pub use graph::{Adjacency, Network, NetworkBuilder, DEFAULT_SAFETY_CEILING};
pub use risk::{RiskAssessment, DEFAULT_RISK_THRESHOLD};
pub use segment::{Danger, Segment, SegmentSpec, SpeedDomain};
