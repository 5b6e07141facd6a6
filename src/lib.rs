pub mod archive;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod orchestrator;
pub mod output;
pub mod static_lists;
pub mod temporal;
pub mod verify;
