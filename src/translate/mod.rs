pub mod client;
pub mod error;
pub mod factory;
pub mod interface;
pub mod languages;
pub mod response;
#[cfg(test)]
pub mod testing;
