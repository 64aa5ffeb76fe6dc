mod console;
mod error;
mod logger;
mod modes;
