mod host;
mod process;
