//! Gerrit topic labeling over the SSH command interface.
//!
//! Resolves topics, queries each one, parses the line-delimited JSON
//! response, and issues one `gerrit review` per valid patch.

pub mod labeler;
pub mod pipeline;
pub mod query;
pub mod records;
pub mod runner;
pub mod topics;
