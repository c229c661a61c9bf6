pub mod config;
pub mod db;
pub mod diagnostics;
pub mod fetcher;
pub mod http;
pub mod logging;
pub mod notifier;
pub mod repositories;
