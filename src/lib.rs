#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(
    clippy::needless_return,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::non_ascii_literal
)]

//! calcplot, a small calculator, function plotter and population share
//! table.
//!
//! The centre of the crate is a restricted expression evaluator for plotting
//! functions of one variable `x`. The easiest way to use it is with the
//! [`evaluate`](fn.evaluate.html) function, which evaluates an expression over
//! a vector of samples:
//!
//! ```
//! use calcplot::{evaluate, sample, Registry};
//!
//! let x = sample(-10.0, 10.0, 5).unwrap();
//! assert_eq!(&*x, &[-10.0, -5.0, 0.0, 5.0, 10.0]);
//! assert_eq!(
//!     evaluate("x**2 / 5", &x, Registry::global()),
//!     Ok(vec![20.0, 5.0, 0.0, 5.0, 20.0])
//! );
//! ```
//!
//! An expression that does not depend on `x` is broadcast to the length of
//! the samples, and any failure on a single sample fails the whole
//! evaluation:
//!
//! ```
//! use calcplot::{evaluate, Error, Registry};
//!
//! assert_eq!(evaluate("5", &[1.0, 2.0, 3.0], Registry::global()), Ok(vec![5.0; 3]));
//! assert_eq!(evaluate("1 / x", &[1.0, 0.0], Registry::global()), Err(Error::DivisionByZero));
//! ```
//!
//! # Language definition
//!
//! An expression can contain the following elements:
//!
//! - float literal values: `12.456`, `0.0045e78`, `.5`, ...;
//! - left and right parenthesis;
//! - mathematical operators: `+` for addition, `-` for subtraction,
//!   `*` for multiplication, `/` for division and `**` (or `^`) for
//!   exponentiation, plus unary `-` and `+`;
//! - the variable `x`;
//! - the constants `pi` and `e`;
//! - function calls to `sin`, `cos`, `tan`, `exp`, `sqrt`, `log` (natural),
//!   `log10` and `abs`.
//!
//! Any other symbol or name is rejected while parsing with
//! [`Error::InvalidExpression`]. The operators follow the usual precedence,
//! with `**` binding tighter than unary minus: `-x**2` is `-(x**2)`.
//!
//! Division by zero, arguments outside a function domain and results too
//! large to represent are errors rather than `inf` or `NaN`.
//!
//! # Technical details
//!
//! Expressions are parsed by a recursive descent parser into an AST whose
//! names are resolved against a closed [`Registry`]. Constant sub-trees are
//! folded while parsing. Evaluation walks the tree once per request,
//! operating on whole sample vectors.
//!
//! The [`calculator`] and [`population`] modules hold the other two tools:
//! elementary arithmetic, logarithm and modular arithmetic, and the
//! per-year population shares behind a choropleth map.

#[macro_use]
extern crate lazy_static;

mod ast;
pub mod calculator;
pub mod chart;
mod checked;
pub mod config;
mod error;
mod expr;
pub mod graph;
mod lexer;
pub mod logging;
mod parser;
pub mod population;
mod registry;
mod sampler;
mod token;

pub use ast::Ast;
pub use chart::{ChartEmitter, ChartFormat, LineSeries};
pub use config::Config;
pub use error::Error;
pub use expr::{eval, evaluate, Evaluation, Expr};
pub use graph::{plot, GraphRequest};
pub use lexer::is_identifier;
pub use registry::{Binding, Domain, Function, Registry, VARIABLE};
pub use sampler::{sample, SampleVector, MIN_SAMPLES};
pub use token::Op;
