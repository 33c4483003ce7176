pub mod client;
mod instructions;
pub mod response;
