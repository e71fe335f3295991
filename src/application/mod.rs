// Application layer - Use cases over the domain, behind repository and source traits
pub mod auth_service;
pub mod device_service;
pub mod export_service;
pub mod graph_service;
pub mod telemetry_repository;
pub mod telemetry_view;
