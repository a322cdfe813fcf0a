#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub mod config;
pub mod distance;
pub mod elevation;
pub mod export_data;
pub mod import_data;
pub mod logs;
pub mod pipeline;
pub mod segment_chainer;
pub mod segment_dedup;
pub mod segment_store;
pub mod simplifier;
pub mod trail_vector;
