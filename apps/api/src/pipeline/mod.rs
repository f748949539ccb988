pub mod catalog;
pub mod links;
pub mod normalizer;
pub mod scheduler;
