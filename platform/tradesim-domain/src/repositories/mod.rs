pub mod chaos;
pub mod trades;
