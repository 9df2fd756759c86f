// stayscope: topic extraction and analytics over hotel reviews.
//
// This is the library root. Each module corresponds to a major subsystem:
// the topic-extraction core, the reviews dataset, terminal output and the
// optional HTTP API.

pub mod config;
pub mod dataset;
pub mod output;
pub mod topics;

#[cfg(feature = "web")]
pub mod web;
