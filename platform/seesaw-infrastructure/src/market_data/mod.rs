pub mod prices;

pub use prices::CsvPriceRepository;
