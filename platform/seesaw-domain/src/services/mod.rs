pub mod alignment;
pub mod audit;
pub mod benchmark;
pub mod contribution;
pub mod engine;
pub mod metrics;
pub mod prices;
pub mod returns;
pub mod rotation;
