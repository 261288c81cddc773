use chrono::{DateTime, NaiveDate, NaiveDateTime};
use seesaw_domain::errors::{BacktestError, Result};
use seesaw_domain::repositories::price_data::{PriceDataRepository, PriceQuery};
use seesaw_domain::services::prices::DataQualityReport;
use seesaw_domain::value_objects::bar::DailyBar;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

const REQUIRED_COLUMNS: [&str; 3] = ["Date", "Open", "Close"];

const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%Y%m%d",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvPriceRepository;

impl CsvPriceRepository {
    pub fn new() -> Self {
        Self
    }
}

impl PriceDataRepository for CsvPriceRepository {
    fn load_daily_prices(&self, query: &PriceQuery) -> Result<(Vec<DailyBar>, DataQualityReport)> {
        let start = Instant::now();
        let result = load_csv(&query.path);
        let result_label = if result.is_ok() { "ok" } else { "err" };
        metrics::counter!("seesaw.infra.prices.load_calls_total", "result" => result_label)
            .increment(1);
        metrics::histogram!("seesaw.infra.prices.load_ms")
            .record(start.elapsed().as_millis() as f64);
        if let Ok((bars, report)) = &result {
            debug!(
                asset = %query.asset,
                path = %query.path.display(),
                rows = report.rows_read,
                kept = bars.len(),
                "loaded price file"
            );
        }
        result
    }
}

/// Reads a spreadsheet export with `Date`, `Open` and `Close` columns.
///
/// Rows with an unparseable date or a non-positive close are dropped and
/// counted. The output is sorted by date with one row per date (last wins).
pub fn load_csv(path: &Path) -> Result<(Vec<DailyBar>, DataQualityReport)> {
    if !path.exists() {
        return Err(BacktestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path)
        .map_err(|err| BacktestError::Io(format!("failed to open {}: {}", path.display(), err)))?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|err| {
            BacktestError::Parse(format!("failed to read header of {}: {}", path.display(), err))
        })?
        .clone();
    let position = |name: &str| headers.iter().position(|h| h == name);
    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| position(name).is_none())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(BacktestError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        });
    }
    let (date_idx, open_idx, close_idx) = match (position("Date"), position("Open"), position("Close")) {
        (Some(d), Some(o), Some(c)) => (d, o, c),
        _ => {
            return Err(BacktestError::MissingColumns {
                path: path.to_path_buf(),
                missing: REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect(),
            })
        }
    };

    let mut by_date: BTreeMap<NaiveDate, DailyBar> = BTreeMap::new();
    let mut report = DataQualityReport::default();
    let mut last_seen: Option<NaiveDate> = None;

    for result in reader.records() {
        let record = result.map_err(|err| {
            BacktestError::Parse(format!("failed to parse row in {}: {}", path.display(), err))
        })?;
        report.rows_read += 1;

        let Some(date) = record.get(date_idx).and_then(parse_date) else {
            report.invalid_date += 1;
            continue;
        };
        let close = record.get(close_idx).and_then(parse_number);
        let Some(close) = close.filter(|c| c.is_finite() && *c > 0.0) else {
            report.invalid_close += 1;
            continue;
        };
        let open = record.get(open_idx).and_then(parse_number);

        if let Some(prev) = last_seen {
            if date < prev {
                report.out_of_order += 1;
                if report.first_out_of_order.is_none() {
                    report.first_out_of_order = Some(date);
                }
            }
        }
        last_seen = Some(date);

        if by_date
            .insert(date, DailyBar { date, open, close })
            .is_some()
        {
            report.duplicates += 1;
            if report.first_duplicate.is_none() {
                report.first_duplicate = Some(date);
            }
        }
    }

    report.first_date = by_date.keys().next().copied();
    report.last_date = by_date.keys().next_back().copied();
    Ok((by_date.into_values().collect(), report))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Parses spreadsheet numbers, tolerating thousands separators.
///
/// A comma is only accepted between groups of three integer digits, so a
/// decimal comma such as `10,5` is rejected instead of read as `105`.
fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value.trim().chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return None;
    }
    if !cleaned.contains(',') {
        return cleaned.parse::<f64>().ok();
    }

    let unsigned = cleaned.trim_start_matches(['-', '+']);
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };
    if fraction.is_some_and(|f| f.contains(',')) {
        return None;
    }
    let mut groups = integer.split(',');
    let lead = groups.next()?;
    if lead.is_empty() || lead.len() > 3 || !groups.all(|group| group.len() == 3) {
        return None;
    }
    cleaned.replace(',', "").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::{load_csv, parse_date, parse_number, CsvPriceRepository};
    use chrono::NaiveDate;
    use seesaw_domain::errors::BacktestError;
    use seesaw_domain::repositories::price_data::{PriceDataRepository, PriceQuery};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_tmp_path(name: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("seesaw_{name}_{}_{}", std::process::id(), now))
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    #[test]
    fn load_csv_canonicalizes_rows() {
        let tmp_path = unique_tmp_path("prices.csv");
        let csv_data = "Date,Open,High,Low,Close,Volume\n\
05/01/2024,10,11,9,10.5,100\n\
02/01/2024,9.5,10,9,9.8,100\n\
05/01/2024,10,11,9,10.7,100\n\
not a date,1,1,1,1,1\n\
08/01/2024,,1,1,0,1\n\
09/01/2024,,1,1,\"1,234.5\",1\n";
        fs::write(&tmp_path, csv_data).expect("write csv");

        let (bars, report) = load_csv(&tmp_path).expect("load csv");
        assert_eq!(report.rows_read, 6);
        assert_eq!(report.invalid_date, 1);
        assert_eq!(report.invalid_close, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.out_of_order, 1);
        assert_eq!(report.first_date, Some(ymd(2024, 1, 2)));
        assert_eq!(report.last_date, Some(ymd(2024, 1, 9)));

        assert_eq!(bars.len(), 3);
        assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
        assert!((bars[1].close - 10.7).abs() < 1e-12);
        assert!(bars[2].open.is_none());
        assert!((bars[2].close - 1234.5).abs() < 1e-12);
    }

    #[test]
    fn commas_only_count_as_thousands_separators() {
        assert_eq!(parse_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_number("-12,345,678"), Some(-12345678.0));
        assert_eq!(parse_number("1_000"), Some(1000.0));
        assert_eq!(parse_number("10,5"), None);
        assert_eq!(parse_number("1,23,456"), None);
        assert_eq!(parse_number("1.234,5"), None);
        assert_eq!(parse_number(",123"), None);
    }

    #[test]
    fn missing_columns_are_listed() {
        let tmp_path = unique_tmp_path("prices_missing.csv");
        fs::write(&tmp_path, "Date,Price\n2024-01-02,10\n").expect("write csv");
        let err = load_csv(&tmp_path).expect_err("missing columns");
        match err {
            BacktestError::MissingColumns { missing, .. } => {
                assert_eq!(missing, vec!["Close".to_string(), "Open".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_reported() {
        let path = unique_tmp_path("does_not_exist.csv");
        let err = CsvPriceRepository::new()
            .load_daily_prices(&PriceQuery {
                asset: "A".to_string(),
                path: path.clone(),
            })
            .expect_err("missing file");
        assert_eq!(err, BacktestError::FileNotFound { path });
    }

    #[test]
    fn parses_iso_and_day_first_dates() {
        let expected = Some(ymd(2024, 3, 7));
        for raw in [
            "2024-03-07",
            "2024/03/07",
            "2024-03-07T00:00:00Z",
            "2024-03-07 15:30:00",
            "07-03-2024",
            "07/03/2024",
            "07.03.2024",
            "07-Mar-2024",
            "07 Mar 2024",
        ] {
            assert_eq!(parse_date(raw), expected, "{raw}");
        }
        assert_eq!(parse_date("2024-13-40"), None);
        assert_eq!(parse_date(""), None);
    }
}
