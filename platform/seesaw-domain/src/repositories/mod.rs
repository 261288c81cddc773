pub mod artifacts;
pub mod price_data;
