//! JobDeck Core
//!
//! Shared data types for the JobDeck workspace. This crate has no
//! dependencies beyond serde, so it can be pulled in by any other crate
//! without dragging along HTTP or async machinery.
//!
//! ## Module Organization
//!
//! - `streaming` - Channel events and delta sinks for routed model output
//! - `job` - Job posting and resume profile models

pub mod job;
pub mod streaming;

pub use job::{ExperienceEntry, JobPosting, ResumeProfile};
pub use streaming::{ChannelEvent, DeltaSink};
