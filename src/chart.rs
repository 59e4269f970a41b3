//! Line chart output. Drawing the chart belongs to whatever consumes these
//! documents; the emitters only hand over the `(x, y)` pairs.

use crate::error::Error;
use serde::Serialize;
use std::io::Write;

/// Sampled function, ready to be drawn as a line chart
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    /// Expression the series was computed from, used as a label
    pub expression: String,
    /// Sample positions, strictly increasing
    pub x: Vec<f64>,
    /// Function values, one per sample
    pub y: Vec<f64>,
}

impl LineSeries {
    /// Iterate over the `(x, y)` pairs of the series
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// Consumer of line series
pub trait ChartEmitter {
    /// Write one series as a complete chart document
    fn emit(&mut self, series: &LineSeries) -> Result<(), Error>;
}

/// Supported chart document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFormat {
    /// [`JsonChartEmitter`]
    Json,
    /// [`CsvChartEmitter`]
    Csv,
}

impl ChartFormat {
    /// Build the emitter for this format, writing to `writer`
    pub fn emitter<'a, W: Write + 'a>(self, writer: W) -> Box<dyn ChartEmitter + 'a> {
        match self {
            Self::Json => Box::new(JsonChartEmitter::new(writer)),
            Self::Csv => Box::new(CsvChartEmitter::new(writer)),
        }
    }
}

#[derive(Serialize)]
struct Point {
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct ChartDocument<'a> {
    expression: &'a str,
    points: Vec<Point>,
}

/// Writes `{"expression": ..., "points": [{"x": .., "y": ..}, ...]}`
pub struct JsonChartEmitter<W: Write> {
    writer: W,
}

impl<W: Write> JsonChartEmitter<W> {
    /// Emitter writing to `writer`
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ChartEmitter for JsonChartEmitter<W> {
    fn emit(&mut self, series: &LineSeries) -> Result<(), Error> {
        let document = ChartDocument {
            expression: &series.expression,
            points: series.points().map(|(x, y)| Point { x, y }).collect(),
        };
        serde_json::to_writer_pretty(&mut self.writer, &document)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes an `x,y` header and one row per sample
pub struct CsvChartEmitter<W: Write> {
    writer: W,
}

impl<W: Write> CsvChartEmitter<W> {
    /// Emitter writing to `writer`
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ChartEmitter for CsvChartEmitter<W> {
    fn emit(&mut self, series: &LineSeries) -> Result<(), Error> {
        let mut csv = csv::Writer::from_writer(&mut self.writer);
        csv.write_record(&["x", "y"])?;
        for point in series.points() {
            csv.serialize(point)?;
        }
        csv.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> LineSeries {
        LineSeries {
            expression: "x**2".into(),
            x: vec![-1.0, 0.0, 1.5],
            y: vec![1.0, 0.0, 2.25],
        }
    }

    #[test]
    fn json() {
        let mut emitter = JsonChartEmitter::new(Vec::new());
        emitter.emit(&series()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&emitter.into_inner()).unwrap();
        assert_eq!(value["expression"], "x**2");
        assert_eq!(value["points"].as_array().unwrap().len(), 3);
        assert_eq!(value["points"][2]["x"], 1.5);
        assert_eq!(value["points"][2]["y"], 2.25);
    }

    #[test]
    fn csv() {
        let mut emitter = CsvChartEmitter::new(Vec::new());
        emitter.emit(&series()).unwrap();
        let text = String::from_utf8(emitter.into_inner()).unwrap();
        assert_eq!(text, "x,y\n-1.0,1.0\n0.0,0.0\n1.5,2.25\n");
    }

    #[test]
    fn boxed_emitter() {
        let mut buffer = Vec::new();
        ChartFormat::Csv
            .emitter(&mut buffer)
            .emit(&series())
            .unwrap();
        assert!(buffer.starts_with(b"x,y\n"));
    }
}
