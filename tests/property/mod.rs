//! Property-based tests

mod classify_proptest;
mod fence_proptest;
mod polling_proptest;
