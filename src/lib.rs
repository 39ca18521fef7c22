pub mod catalog;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod fetch;
pub mod location;
pub mod logging;
pub mod parallel;
pub mod progress;
pub mod report;
pub mod runner;
pub mod text;
