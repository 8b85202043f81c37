//! Integration tests for outline-to-essay generation

mod cli_commands;
mod config_integration;
mod orchestration;
mod test_utils;
