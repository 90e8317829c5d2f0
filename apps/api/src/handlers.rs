pub mod audit;
pub mod graph;
pub mod health;
