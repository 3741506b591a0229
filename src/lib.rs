//! Ebook Chain — weighted Markov-chain generation of short texts.
//!
//! Builds prefix→successor frequency tables from a growing corpus of short
//! lines and walks them to produce character-budgeted output, optionally
//! merging spellings that differ only in case or punctuation.

pub mod core;
pub mod schema;
