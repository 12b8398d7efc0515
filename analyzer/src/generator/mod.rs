pub mod profile;
pub mod thumbnail;
