//! Per-country population tables, filtered to one year and turned into
//! choropleth data.
//!
//! Loading coerces the user-mapped columns and drops rows that cannot be
//! coerced. A year is then selected, duplicate countries are removed, and each
//! country gets either its share of the year's total or a population bin.
//! Drawing the map is left to a [`ChoroplethRenderer`].

use crate::config::PopulationConfig;
use crate::error::Error;
use hashbrown::HashSet;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Which CSV header holds each field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRoles {
    /// Country name header
    pub country: String,
    /// Year header
    pub year: String,
    /// Population header
    pub population: String,
}

impl ColumnRoles {
    /// Headers configured in [`PopulationConfig`]
    pub fn from_config(config: &PopulationConfig) -> Self {
        Self {
            country: config.country_column.clone(),
            year: config.year_column.clone(),
            population: config.population_column.clone(),
        }
    }
}

/// One coerced CSV row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationRecord {
    /// Country name, as written in the data
    pub country: String,
    /// Census year
    pub year: i32,
    /// Head count, never negative
    pub population: f64,
}

/// Read population records from CSV data with a header row.
///
/// Rows whose year is not an integer, whose population is not a finite
/// non-negative number, or whose country is blank are dropped.
pub fn load_csv<R: Read>(reader: R, roles: &ColumnRoles) -> Result<Vec<PopulationRecord>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers.iter().position(|header| header == name).ok_or_else(|| {
            Error::DataFormatError(format!(
                "column '{}' not found, available columns: {}",
                name,
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })
    };
    let country_index = column(&roles.country)?;
    let year_index = column(&roles.year)?;
    let population_index = column(&roles.population)?;

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                debug!(%err, "unreadable csv row");
                dropped += 1;
                continue;
            }
        };

        let record = match (
            row.get(country_index).filter(|country| !country.is_empty()),
            row.get(year_index).and_then(coerce_year),
            row.get(population_index).and_then(coerce_population),
        ) {
            (Some(country), Some(year), Some(population)) => PopulationRecord {
                country: country.to_owned(),
                year,
                population,
            },
            _ => {
                dropped += 1;
                continue;
            }
        };
        records.push(record);
    }

    if dropped > 0 {
        warn!(dropped, kept = records.len(), "dropped rows that could not be coerced");
    }
    if records.is_empty() {
        return Err(Error::DataFormatError(
            "no usable rows in the population data".into(),
        ));
    }
    debug!(rows = records.len(), "loaded population data");
    Ok(records)
}

/// [`load_csv`] from a file
pub fn load_csv_path(
    path: impl AsRef<Path>,
    roles: &ColumnRoles,
) -> Result<Vec<PopulationRecord>, Error> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| {
        Error::DataFormatError(format!("cannot open {}: {}", path.display(), err))
    })?;
    load_csv(file, roles)
}

fn coerce_year(field: &str) -> Option<i32> {
    let year: f64 = field.parse().ok()?;
    if year.fract() != 0.0 || year < f64::from(i32::MIN) || year > f64::from(i32::MAX) {
        return None;
    }
    Some(year as i32)
}

fn coerce_population(field: &str) -> Option<f64> {
    let population: f64 = field.replace(',', "").parse().ok()?;
    if population.is_finite() && population >= 0.0 {
        Some(population)
    } else {
        None
    }
}

/// Years present in `records` that may be displayed
pub fn selectable_years(records: &[PopulationRecord], allowed: &BTreeSet<i32>) -> BTreeSet<i32> {
    records
        .iter()
        .map(|record| record.year)
        .filter(|year| allowed.contains(year))
        .collect()
}

/// Rows for `year`, keeping the first row of each country
pub fn rows_for_year(records: &[PopulationRecord], year: i32) -> Result<Vec<PopulationRecord>, Error> {
    let mut seen = HashSet::new();
    let rows: Vec<PopulationRecord> = records
        .iter()
        .filter(|record| record.year == year)
        .filter(|record| seen.insert(record.country.as_str()))
        .cloned()
        .collect();
    if rows.is_empty() {
        return Err(Error::DataFormatError(format!("no rows for year {}", year)));
    }
    Ok(rows)
}

/// A country's share of the total population of the selected year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRow {
    /// Country name
    pub country: String,
    /// Head count
    pub population: f64,
    /// Percentage, `population / total * 100`
    pub share: f64,
}

/// Percentage of the total for each row. The shares sum to 100.
pub fn pop_share(rows: &[PopulationRecord]) -> Result<Vec<ShareRow>, Error> {
    let total: f64 = rows.iter().map(|row| row.population).sum();
    if !(total > 0.0 && total.is_finite()) {
        return Err(Error::DataFormatError(format!(
            "cannot compute shares of a total population of {}",
            total
        )));
    }
    Ok(rows
        .iter()
        .map(|row| ShareRow {
            country: row.country.clone(),
            population: row.population,
            share: row.population / total * 100.0,
        })
        .collect())
}

/// Labels of the population bins, smallest first
pub const BIN_LABELS: [&str; 6] = [
    "< 1M",
    "1M–10M",
    "10M–50M",
    "50M–100M",
    "100M–500M",
    "≥ 500M",
];

/// Lower bounds of every bin but the first
const BIN_THRESHOLDS: [f64; 5] = [1e6, 1e7, 5e7, 1e8, 5e8];

/// Bin label of a population. Lower bounds are inclusive.
pub fn bin_label(population: f64) -> &'static str {
    let index = BIN_THRESHOLDS
        .iter()
        .take_while(|&&threshold| population >= threshold)
        .count();
    BIN_LABELS[index]
}

/// How countries are colored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Continuous scale over the percentage of the total
    Share,
    /// Categorical scale over population bins
    Binned,
}

/// Value a country is colored by
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChoroplethValue {
    /// Percentage of the year's total
    Share(f64),
    /// One of [`BIN_LABELS`]
    Category(&'static str),
}

/// One country of the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethRow {
    /// Country name, the key of the map
    pub country: String,
    /// Color value
    pub value: ChoroplethValue,
}

/// Color scale description for the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ColorScale {
    /// Gradient between the smallest and largest share
    Continuous { min: f64, max: f64 },
    /// One color per label, in order
    Categorical { labels: Vec<&'static str> },
}

/// Everything a map renderer needs for one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethData {
    /// Selected year
    pub year: i32,
    /// How values map to colors
    pub scale: ColorScale,
    /// One row per country
    pub rows: Vec<ChoroplethRow>,
}

/// Build the map data for `year`. The year must be allowed and present in the
/// data.
pub fn build_choropleth(
    records: &[PopulationRecord],
    year: i32,
    mode: ColorMode,
    allowed: &BTreeSet<i32>,
) -> Result<ChoroplethData, Error> {
    let selectable = selectable_years(records, allowed);
    if !selectable.contains(&year) {
        return Err(Error::DataFormatError(format!(
            "year {} is not selectable, available years: {}",
            year,
            selectable
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    let rows = rows_for_year(records, year)?;
    let data = match mode {
        ColorMode::Share => {
            let shares = pop_share(&rows)?;
            let max = shares.iter().map(|row| row.share).fold(0.0, f64::max);
            ChoroplethData {
                year,
                scale: ColorScale::Continuous { min: 0.0, max },
                rows: shares
                    .into_iter()
                    .map(|row| ChoroplethRow {
                        country: row.country,
                        value: ChoroplethValue::Share(row.share),
                    })
                    .collect(),
            }
        }
        ColorMode::Binned => ChoroplethData {
            year,
            scale: ColorScale::Categorical {
                labels: BIN_LABELS.to_vec(),
            },
            rows: rows
                .into_iter()
                .map(|row| ChoroplethRow {
                    value: ChoroplethValue::Category(bin_label(row.population)),
                    country: row.country,
                })
                .collect(),
        },
    };
    debug!(year, ?mode, countries = data.rows.len(), "built choropleth data");
    Ok(data)
}

/// Draws a choropleth keyed by country name
pub trait ChoroplethRenderer {
    /// Render the map for one year
    fn render(&mut self, data: &ChoroplethData) -> Result<(), Error>;
}

/// Serializes the map data as JSON for an external map renderer
pub struct JsonChoroplethRenderer<W: Write> {
    writer: W,
}

impl<W: Write> JsonChoroplethRenderer<W> {
    /// Renderer writing to `writer`
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ChoroplethRenderer for JsonChoroplethRenderer<W> {
    fn render(&mut self, data: &ChoroplethData) -> Result<(), Error> {
        serde_json::to_writer_pretty(&mut self.writer, data)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ALLOWED_YEARS;
    use approx::assert_relative_eq;
    use test_case::test_case;

    fn roles() -> ColumnRoles {
        ColumnRoles::from_config(&PopulationConfig::default())
    }

    fn allowed() -> BTreeSet<i32> {
        DEFAULT_ALLOWED_YEARS.iter().copied().collect()
    }

    fn record(country: &str, year: i32, population: f64) -> PopulationRecord {
        PopulationRecord {
            country: country.into(),
            year,
            population,
        }
    }

    const SAMPLE: &str = "\
country,year,population
Korea,2020,51.8
Japan,2020,126.2
Korea,2020,999
Chile,2020,19.1
Korea,1971,32.9
Korea,1970,31.4
";

    #[test]
    fn loads_and_coerces() {
        let data = "\
name,yr,pop,extra
 Korea , 2020.0 ,\"51,836,239\",x
Japan,n/a,1,x
Chile,2020,-5,x
,2020,5,x
Peru,2020,abc,x
France,2020.5,10,x
Spain,2020
";
        let roles = ColumnRoles {
            country: "name".into(),
            year: "yr".into(),
            population: "pop".into(),
        };
        let records = load_csv(data.as_bytes(), &roles).unwrap();
        assert_eq!(records, vec![record("Korea", 2020, 51_836_239.0)]);
    }

    #[test]
    fn missing_column() {
        let roles = ColumnRoles {
            population: "people".into(),
            ..roles()
        };
        match load_csv(SAMPLE.as_bytes(), &roles) {
            Err(Error::DataFormatError(message)) => {
                assert!(message.contains("'people'"), "{}", message);
                assert!(message.contains("country, year, population"), "{}", message);
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn nothing_usable() {
        let data = "country,year,population\nKorea,soon,many\n";
        assert!(matches!(
            load_csv(data.as_bytes(), &roles()),
            Err(Error::DataFormatError(_))
        ));
        assert!(load_csv_path("/nonexistent/population.csv", &roles()).is_err());
    }

    #[test]
    fn year_filter() {
        let records = vec![
            record("A", 1970, 1.0),
            record("A", 1971, 1.0),
            record("A", 2022, 1.0),
        ];
        let years: Vec<i32> = selectable_years(&records, &allowed()).into_iter().collect();
        assert_eq!(years, vec![1970, 2022]);
    }

    #[test]
    fn deduplicates_by_country() {
        let records = load_csv(SAMPLE.as_bytes(), &roles()).unwrap();
        let rows = rows_for_year(&records, 2020).unwrap();
        let countries: Vec<&str> = rows.iter().map(|row| row.country.as_str()).collect();
        assert_eq!(countries, vec!["Korea", "Japan", "Chile"]);
        assert_eq!(rows[0].population, 51.8);

        assert!(matches!(rows_for_year(&records, 1990), Err(Error::DataFormatError(_))));
    }

    #[test]
    fn shares() {
        let rows = vec![
            record("A", 2020, 10.0),
            record("B", 2020, 30.0),
            record("C", 2020, 60.0),
        ];
        let shares = pop_share(&rows).unwrap();
        let values: Vec<f64> = shares.iter().map(|row| row.share).collect();
        assert_relative_eq!(values[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(values[1], 30.0, epsilon = 1e-9);
        assert_relative_eq!(values[2], 60.0, epsilon = 1e-9);
        assert_relative_eq!(values.iter().sum::<f64>(), 100.0, epsilon = 1e-9);

        let empty = vec![record("A", 2020, 0.0)];
        assert!(matches!(pop_share(&empty), Err(Error::DataFormatError(_))));
    }

    #[test_case(0.0 => "< 1M")]
    #[test_case(999_999.0 => "< 1M")]
    #[test_case(1e6 => "1M–10M")]
    #[test_case(49_999_999.0 => "10M–50M")]
    #[test_case(5e7 => "50M–100M")]
    #[test_case(1.4e9 => "≥ 500M")]
    fn bins(population: f64) -> &'static str {
        bin_label(population)
    }

    #[test]
    fn choropleth() {
        let records = load_csv(SAMPLE.as_bytes(), &roles()).unwrap();

        let data = build_choropleth(&records, 2020, ColorMode::Binned, &allowed()).unwrap();
        assert_eq!(data.rows.len(), 3);
        assert_eq!(data.rows[0].value, ChoroplethValue::Category("< 1M"));
        assert!(matches!(data.scale, ColorScale::Categorical { ref labels } if labels.len() == 6));

        let data = build_choropleth(&records, 2020, ColorMode::Share, &allowed()).unwrap();
        let total: f64 = data
            .rows
            .iter()
            .map(|row| match row.value {
                ChoroplethValue::Share(share) => share,
                ChoroplethValue::Category(_) => panic!("expected a share"),
            })
            .sum();
        assert_relative_eq!(total, 100.0, epsilon = 1e-9);

        // present in the data but not allowed
        assert!(matches!(
            build_choropleth(&records, 1971, ColorMode::Share, &allowed()),
            Err(Error::DataFormatError(_))
        ));
        // allowed but absent
        assert!(matches!(
            build_choropleth(&records, 2022, ColorMode::Share, &allowed()),
            Err(Error::DataFormatError(_))
        ));
    }

    #[test]
    fn json_renderer() {
        let records = vec![record("Korea", 2020, 3.0), record("Japan", 2020, 1.0)];
        let data = build_choropleth(&records, 2020, ColorMode::Share, &allowed()).unwrap();
        let mut renderer = JsonChoroplethRenderer::new(Vec::new());
        renderer.render(&data).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&renderer.into_inner()).unwrap();
        assert_eq!(value["year"], 2020);
        assert_eq!(value["scale"]["kind"], "continuous");
        assert_eq!(value["scale"]["max"], 75.0);
        assert_eq!(value["rows"][0]["country"], "Korea");
        assert_eq!(value["rows"][0]["value"], 75.0);
    }
}
