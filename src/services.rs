pub mod document;
pub mod pricing_service;
pub mod registration_service;
pub mod tour_repository;
