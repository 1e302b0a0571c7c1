//! CLI command implementations.

mod add;
mod chat;
mod config;
mod delete;
mod doctor;
mod init;
mod list;
mod lookup;
mod random;
mod serve;
mod stats;

pub use add::run_add;
pub use chat::run_chat;
pub use config::run_config;
pub use delete::run_delete;
pub use doctor::run_doctor;
pub use init::run_init;
pub use list::run_list;
pub use lookup::run_lookup;
pub use random::run_random;
pub use serve::run_serve;
pub use stats::run_stats;
