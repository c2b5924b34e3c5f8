//! Network types and HTTP helpers.

pub mod like;
