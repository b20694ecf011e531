pub mod repository;
pub mod sample;
pub mod sqlite;
