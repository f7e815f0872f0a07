//! Shared fixtures for core integration tests.

#![allow(dead_code)]

pub mod harness;
pub mod mocks;
