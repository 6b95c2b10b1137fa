//! Application layer: selection state, extraction, and delivery.

pub mod decode;
pub mod export;
pub mod extract;
pub mod filter;
pub mod selection;
pub mod tree;
pub mod worker;
