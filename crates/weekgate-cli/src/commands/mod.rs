pub mod access;
pub mod config;
pub mod countdown;
pub mod gate;
pub mod schedule;
