pub mod registration;
pub mod selection;
pub mod tour;
