pub mod command_handlers;
pub mod processor;
