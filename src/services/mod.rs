pub mod catalog_fetch;
pub mod config_loader;
pub mod race_client;
pub mod race_flow;
pub mod race_session;
