//! Command implementations for the CLI.

mod config;
mod db;
mod edit;
mod products;
mod run;
mod scan;
mod settings;

pub use config::cmd_config;
pub use db::cmd_db;
pub use edit::cmd_edit;
pub use products::cmd_products;
pub use run::cmd_run;
pub use scan::cmd_scan;
pub use settings::cmd_settings;
