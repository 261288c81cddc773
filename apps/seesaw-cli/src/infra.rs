use seesaw_domain::repositories::artifacts::{ArtifactReader, ArtifactWriter};
use seesaw_domain::repositories::price_data::PriceDataRepository;
use seesaw_infrastructure::artifacts::{FilesystemArtifactReader, FilesystemArtifactWriter};
use seesaw_infrastructure::market_data::CsvPriceRepository;

pub struct EngineDeps {
    pub prices: Box<dyn PriceDataRepository>,
    pub artifacts: Box<dyn ArtifactWriter>,
}

pub struct ValidateDeps {
    pub prices: Box<dyn PriceDataRepository>,
}

pub struct ReportingDeps {
    pub reader: Box<dyn ArtifactReader>,
    pub writer: Box<dyn ArtifactWriter>,
}

pub fn build_engine_deps() -> EngineDeps {
    EngineDeps {
        prices: Box::new(CsvPriceRepository::new()),
        artifacts: Box::new(FilesystemArtifactWriter::new()),
    }
}

pub fn build_validate_deps() -> ValidateDeps {
    ValidateDeps {
        prices: Box::new(CsvPriceRepository::new()),
    }
}

pub fn build_reporting_deps() -> ReportingDeps {
    ReportingDeps {
        reader: Box::new(FilesystemArtifactReader::new()),
        writer: Box::new(FilesystemArtifactWriter::new()),
    }
}
