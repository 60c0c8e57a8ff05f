// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod csv_dataset;
pub mod figure_mapper;
pub mod source_repository;
