pub mod grading;
pub mod handlers;
pub mod questions;
pub mod runner;
