pub mod messages;
pub mod schedule;
