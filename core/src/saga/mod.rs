// core/src/saga/mod.rs

//! Defines `Saga<TData, E>`: its construction, step hooks and execution.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::Saga;
