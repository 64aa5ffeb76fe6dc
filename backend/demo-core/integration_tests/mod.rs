mod config;
mod error;
mod helpers;
mod protocol;
mod supervisor;
mod transport;
