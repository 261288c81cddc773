pub mod bar;
pub mod equity_point;
pub mod holding;
pub mod month;
pub mod price_series;
pub mod return_series;
