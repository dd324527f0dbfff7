//! Tenant-scoped persistence and services around the cartwright pricing engine.

pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;
