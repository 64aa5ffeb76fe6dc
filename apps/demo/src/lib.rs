// Library exports for testing
// The binary (main.rs) imports these as well

pub mod cli;
pub mod console;
pub mod engine;
pub mod error;
pub mod logger;
pub mod modes;

#[cfg(test)]
mod tests;
