//! Integration test crate for Scrollcast.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the scrollcast crates to verify they work together.


#[cfg(test)]
mod audio;
