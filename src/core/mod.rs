//! Model construction and text generation.

pub mod canon;
pub mod engine;
pub mod generator;
pub mod model;
pub mod weighted;
