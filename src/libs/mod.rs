pub mod ancestry;
pub mod config;
pub mod error;
pub mod forest;
pub mod io;
pub mod lineage;
pub mod score;
pub mod stats;
pub mod trajectory;
