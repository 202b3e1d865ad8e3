mod fetch_model;
mod init;
mod predict;

pub use fetch_model::cmd_fetch_model;
pub use init::cmd_init;
pub use predict::cmd_predict;
