pub mod commands;
pub mod telemetry;
pub mod workspace;
