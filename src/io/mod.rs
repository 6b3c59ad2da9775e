pub mod config_io;
pub mod logging;
pub mod remote;
pub mod sync_client;
