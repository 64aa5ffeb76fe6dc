mod capability;
mod machine;
mod message;
