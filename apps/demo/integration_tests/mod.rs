mod cli;
mod console;
