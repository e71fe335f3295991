// Domain layer - Telemetry shaping with no I/O
pub mod admin;
pub mod aggregation;
pub mod chart;
pub mod snapshot;
pub mod telemetry;
pub mod window;
