//! Concrete adapters for the database ports.

pub mod postgres;
