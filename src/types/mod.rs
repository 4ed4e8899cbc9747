mod theme;
mod user;

pub use theme::Theme;
pub use user::{NewUser, User};
