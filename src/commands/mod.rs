pub mod init;
pub mod theme;
pub mod users;
