// Application layer - Use cases and repository seams
pub mod dataset_repository;
pub mod goal_service;
pub mod projector;
