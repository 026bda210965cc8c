// Application layer - Use cases and repository traits
pub mod config_repository;
pub mod dashboard_service;
pub mod layout_store;
