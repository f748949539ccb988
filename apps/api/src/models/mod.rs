pub mod attempt;
pub mod candidate;
pub mod interview;
pub mod job;
pub mod question;
