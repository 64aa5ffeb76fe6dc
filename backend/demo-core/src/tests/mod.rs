mod connection_state;
mod frame;
mod log_policy;
mod membership;
mod token;
mod wire;
