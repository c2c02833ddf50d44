pub mod chat;
pub mod games;
pub mod guide;
pub mod home;
pub mod progress;
