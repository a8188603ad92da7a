//! Basket services, storage and wiring on top of the `trolley` pricing core.

pub mod context;
pub mod database;
pub mod domain;
pub mod repository;

#[cfg(test)]
mod test;
