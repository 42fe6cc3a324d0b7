mod common;
pub use self::common::*;
mod error;
pub use self::error::{Error, Result};
pub mod link_graph;
pub use self::link_graph::LinkGraph;

pub mod page_rank;

#[cfg(test)]
mod fixtures;
