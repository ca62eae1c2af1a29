// Library for the agent binary and tests

#![cfg_attr(test, recursion_limit = "256")]

pub mod checks;
pub mod config;
pub mod docker_repo;
pub mod models;
pub mod normalize;
pub mod version;
pub mod worker;
