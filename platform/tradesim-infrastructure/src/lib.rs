pub mod chaos;
pub mod exposition;
pub mod persistence;
