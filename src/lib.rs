// ABOUTME: Library module for dynamo-archiver
// ABOUTME: Exports all core functionality for use in binary and tests

pub mod commands;
pub mod config;
pub mod dynamo;
pub mod interactive;
pub mod store;
pub mod utils;
