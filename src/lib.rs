pub mod announcement;
pub mod announcer;
pub mod command_handler;
pub mod commands;
pub mod config;
pub mod error;
pub mod event_store;
pub mod http_server;
pub mod reminder_scheduler;
