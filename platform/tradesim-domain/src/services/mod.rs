pub mod chaos;
pub mod generator;
