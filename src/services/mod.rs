pub mod api_client;
pub mod backend;
pub mod metrics_manager;
pub mod prompt;
pub mod relay;
pub mod terminal;
