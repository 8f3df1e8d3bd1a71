mod init;
mod search;
mod user;

pub use init::cmd_init;
pub use search::cmd_search;
pub use user::cmd_user_add;
