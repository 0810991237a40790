pub mod api_client;
pub mod catalog;
pub mod error;
pub mod session;
pub mod settings;
pub mod storage;
pub mod utils;
