mod agent;
mod controller;
mod session;
mod worker;
