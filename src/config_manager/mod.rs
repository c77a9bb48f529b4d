pub mod history;
pub mod main;
pub mod system;
pub mod translation;
pub mod utils;

pub use main::Config;
