pub mod database;
pub mod startup;
pub mod telemetry;
pub mod wiring;
