pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod inject;
pub mod input;
pub mod logging;
pub mod notify;
pub mod output;
pub mod procfs;
pub mod resolve;
pub mod scan;
