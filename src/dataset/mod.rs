pub mod benchmarks;
pub mod columns;
pub mod models;
pub mod stats;
