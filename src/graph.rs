//! Sampling and evaluating an expression into a line series.

use crate::chart::{ChartEmitter, LineSeries};
use crate::config::GraphConfig;
use crate::error::Error;
use crate::expr::Expr;
use crate::registry::Registry;
use crate::sampler::sample;
use tracing::debug;

/// A request to plot one expression over an interval
#[derive(Debug, Clone, PartialEq)]
pub struct GraphRequest {
    /// Expression in `x`
    pub expression: String,
    /// Lower bound of the interval
    pub min: f64,
    /// Upper bound of the interval
    pub max: f64,
    /// Number of evenly spaced samples, both bounds included
    pub samples: usize,
}

impl GraphRequest {
    /// A request over the configured default interval and sample count
    pub fn new(expression: impl Into<String>, config: &GraphConfig) -> Self {
        Self {
            expression: expression.into(),
            min: config.min,
            max: config.max,
            samples: config.samples,
        }
    }
}

/// Sample the requested interval and evaluate the expression over it, using
/// the standard registry.
///
/// # Example
///
/// ```
/// # use calcplot::{plot, GraphRequest, config::GraphConfig};
/// let request = GraphRequest { expression: "x**2".into(), min: -2.0, max: 2.0, samples: 5 };
/// let series = plot(&request, &GraphConfig::default()).unwrap();
/// assert_eq!(series.y, vec![4.0, 1.0, 0.0, 1.0, 4.0]);
/// ```
pub fn plot(request: &GraphRequest, config: &GraphConfig) -> Result<LineSeries, Error> {
    plot_with(request, config, Registry::global())
}

/// Like [`plot`], resolving names against `registry`.
pub fn plot_with(
    request: &GraphRequest,
    config: &GraphConfig,
    registry: &Registry,
) -> Result<LineSeries, Error> {
    if request.samples > config.max_samples {
        return Err(Error::InvalidRange(format!(
            "at most {} samples are allowed, got {}",
            config.max_samples, request.samples
        )));
    }

    let x = sample(request.min, request.max, request.samples)?;
    let expr = Expr::parse_with(&request.expression, registry)?;
    let y = expr.eval(&x)?.broadcast(x.len());
    debug!(
        expression = %request.expression,
        constant = !expr.depends_on_x(),
        points = y.len(),
        "plotted expression"
    );

    Ok(LineSeries {
        expression: request.expression.clone(),
        x: x.into_vec(),
        y,
    })
}

/// Plot `request` and hand the series to the emitter returned by `open`.
///
/// `open` only runs once the series has been computed, so a failed request
/// never touches the output.
pub fn plot_to<'a, F>(request: &GraphRequest, config: &GraphConfig, open: F) -> Result<LineSeries, Error>
where
    F: FnOnce() -> Result<Box<dyn ChartEmitter + 'a>, Error>,
{
    let series = plot(request, config)?;
    open()?.emit(&series)?;
    Ok(series)
}
