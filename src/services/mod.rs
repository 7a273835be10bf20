//! Business logic services

pub mod gateway;
pub mod mapping;
pub mod messaging;
pub mod normalizer;
pub mod optimizer;
pub mod spreadsheet;
pub mod workflow;
