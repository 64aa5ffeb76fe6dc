mod link;
mod server;
