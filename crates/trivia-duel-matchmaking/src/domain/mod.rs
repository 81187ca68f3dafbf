pub mod commands;
pub mod messages;
pub mod queues;
