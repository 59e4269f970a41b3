use crate::ast::Ast;
use crate::checked;
use crate::error::Error;
use crate::parser;
use crate::registry::Registry;
use tracing::{debug, trace};

/// Evaluate `expression` over the samples in `x`, using the names from
/// `registry`.
///
/// The result always has the length of `x`: an expression that does not
/// depend on `x` is broadcast. A failure on any element fails the whole
/// evaluation.
///
/// # Example
///
/// ```
/// # use calcplot::{evaluate, Registry};
/// let x = [-2.0, -1.0, 0.0, 1.0, 2.0];
/// assert_eq!(evaluate("x**2", &x, Registry::global()), Ok(vec![4.0, 1.0, 0.0, 1.0, 4.0]));
/// assert_eq!(evaluate("5", &x[..3], Registry::global()), Ok(vec![5.0, 5.0, 5.0]));
/// assert!(evaluate("__import__('os')", &x, Registry::global()).is_err());
/// ```
pub fn evaluate(expression: &str, x: &[f64], registry: &Registry) -> Result<Vec<f64>, Error> {
    let expr = Expr::parse_with(expression, registry)?;
    Ok(expr.eval(x)?.broadcast(x.len()))
}

/// Evaluate a single expression at one point, with the standard registry.
///
/// # Example
///
/// ```
/// # use calcplot::eval;
/// assert_eq!(eval("45 - 2**3", 0.0), Ok(37.0));
/// assert_eq!(eval("3 * x", -5.0), Ok(-15.0));
/// ```
pub fn eval(input: &str, x: f64) -> Result<f64, Error> {
    Expr::parse(input).and_then(|expr| expr.eval_at(x))
}

/// Result of evaluating an expression over a sample vector
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// One value per sample
    Vector(Vec<f64>),
    /// The expression does not depend on `x`
    Scalar(f64),
}

impl Evaluation {
    /// Expand to a vector of length `len`, repeating a scalar result.
    pub fn broadcast(self, len: usize) -> Vec<f64> {
        match self {
            Self::Vector(values) => values,
            Self::Scalar(value) => vec![value; len],
        }
    }

    fn map(self, func: impl Fn(f64) -> Result<f64, Error>) -> Result<Self, Error> {
        match self {
            Self::Scalar(value) => func(value).map(Self::Scalar),
            Self::Vector(values) => values
                .into_iter()
                .map(func)
                .collect::<Result<_, _>>()
                .map(Self::Vector),
        }
    }

    fn zip(
        self,
        other: Self,
        func: impl Fn(f64, f64) -> Result<f64, Error>,
    ) -> Result<Self, Error> {
        match (self, other) {
            (Self::Scalar(left), Self::Scalar(right)) => func(left, right).map(Self::Scalar),
            (Self::Vector(left), Self::Scalar(right)) => {
                Self::Vector(left).map(|l| func(l, right))
            }
            (Self::Scalar(left), Self::Vector(right)) => {
                Self::Vector(right).map(|r| func(left, r))
            }
            (Self::Vector(left), Self::Vector(right)) => left
                .into_iter()
                .zip(right)
                .map(|(l, r)| func(l, r))
                .collect::<Result<_, _>>()
                .map(Self::Vector),
        }
    }
}

/// A parsed and optimized mathematical expression in the single variable `x`.
///
/// # Examples
/// ```
/// # use calcplot::{Expr, Evaluation};
/// let expr = Expr::parse("3 + 5 * 2").unwrap();
/// assert_eq!(expr.eval(&[1.0, 2.0]), Ok(Evaluation::Scalar(13.0)));
///
/// let expr = Expr::parse("-2 * x").unwrap();
/// assert_eq!(expr.eval(&[1.0, 2.0]), Ok(Evaluation::Vector(vec![-2.0, -4.0])));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    ast: Ast,
}

impl Expr {
    /// Parse the given mathematical `expression` against the standard
    /// [`Registry`].
    ///
    /// # Examples
    /// ```
    /// # use calcplot::Expr;
    /// // A valid expression
    /// assert!(Expr::parse("3 + 5 * 2").is_ok());
    /// // an invalid expression
    /// assert!(Expr::parse("3eff + 5 * 2").is_err());
    /// ```
    pub fn parse(expression: &str) -> Result<Self, Error> {
        Self::parse_with(expression, Registry::global())
    }

    /// Parse `expression`, resolving names in `registry`.
    pub fn parse_with(expression: &str, registry: &Registry) -> Result<Self, Error> {
        let ast = parser::parse(expression, registry)?;
        debug!(expression, ?ast, "parsed expression");
        Ok(Self { ast })
    }

    /// Evaluate the expression for every sample in `x`.
    pub fn eval(&self, x: &[f64]) -> Result<Evaluation, Error> {
        trace!(samples = x.len(), "evaluating expression");
        Self::inner_eval(&self.ast, x)
    }

    /// Evaluate the expression at a single point.
    pub fn eval_at(&self, x: f64) -> Result<f64, Error> {
        match self.eval(&[x])? {
            Evaluation::Scalar(value) => Ok(value),
            Evaluation::Vector(values) => Ok(values[0]),
        }
    }

    fn inner_eval(ast: &Ast, x: &[f64]) -> Result<Evaluation, Error> {
        match *ast {
            Ast::Variable => Ok(Evaluation::Vector(x.to_vec())),
            Ast::Value(number) => Ok(Evaluation::Scalar(number)),
            Ast::Neg(ref arg) => Self::inner_eval(arg, x)?.map(|value| Ok(-value)),
            Ast::Function(ref func, ref arg) => {
                Self::inner_eval(arg, x)?.map(|value| func.apply(value))
            }
            Ast::Binary(op, ref left, ref right) => {
                let left = Self::inner_eval(left, x)?;
                let right = Self::inner_eval(right, x)?;
                left.zip(right, |l, r| checked::binary(op, l, r))
            }
        }
    }

    /// Check if the expression references `x`
    ///
    /// # Examples
    /// ```
    /// # use calcplot::Expr;
    /// assert!(!Expr::parse("3 + pi").unwrap().depends_on_x());
    /// assert!(Expr::parse("3 + x").unwrap().depends_on_x());
    /// ```
    pub fn depends_on_x(&self) -> bool {
        self.ast.depends_on_variable()
    }

    /// The optimized syntax tree
    pub fn ast(&self) -> &Ast {
        &self.ast
    }
}

#[cfg(test)]
mod tests {
    use super::{eval, evaluate, Evaluation, Expr};
    use crate::error::Error;
    use crate::registry::Registry;
    use approx::assert_relative_eq;

    fn over(expression: &str, x: &[f64]) -> Result<Vec<f64>, Error> {
        evaluate(expression, x, Registry::global())
    }

    #[test]
    fn scalar_eval() {
        let eval_pairs = [
            ("3 + 5", 0.0, 8.0),
            ("2 - 5", 0.0, -3.0),
            ("2 * 5", 0.0, 10.0),
            ("10 / 5", 0.0, 2.0),
            ("2 ** 3", 0.0, 8.0),
            ("2 ^ 3", 0.0, 8.0),
            ("-3", 0.0, -3.0),
            ("25 + -3", 0.0, 22.0),
            ("25 - -3", 0.0, 28.0),
            ("3 + 5 * 2", 0.0, 13.0),
            ("sqrt(9)", 0.0, 3.0),
            ("sin(18.0) * 3", 0.0, 3.0 * f64::sin(18.0)),
            ("2 * x", 1.0, 2.0),
            ("(x + 2)**2", 1.0, 9.0),
            ("abs(x)", -4.5, 4.5),
        ];
        for (input, x, expected) in &eval_pairs {
            assert_eq!(eval(input, *x), Ok(*expected), "{}", input);
        }
    }

    #[test]
    fn vector_eval() {
        assert_eq!(
            over("x**2", &[-2.0, -1.0, 0.0, 1.0, 2.0]),
            Ok(vec![4.0, 1.0, 0.0, 1.0, 4.0])
        );
        assert_eq!(over("sin(x)", &[0.0]), Ok(vec![0.0]));
        assert_eq!(over("x - x", &[3.0, 7.0]), Ok(vec![0.0, 0.0]));

        let y = over("cos(pi * x) + exp(x) * log(e)", &[0.0, 1.0]).unwrap();
        assert_relative_eq!(y[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(y[1], -1.0 + std::f64::consts::E, epsilon = 1e-12);
    }

    #[test]
    fn scalar_broadcast() {
        assert_eq!(over("5", &[1.0, 2.0, 3.0]), Ok(vec![5.0, 5.0, 5.0]));
        assert_eq!(over("2 * pi", &[1.0, 2.0]), Ok(vec![std::f64::consts::TAU; 2]));
        assert_eq!(over("5", &[]), Ok(vec![]));

        let expr = Expr::parse("sqrt(16)").unwrap();
        assert!(!expr.depends_on_x());
        assert_eq!(expr.eval(&[0.0, 1.0]), Ok(Evaluation::Scalar(4.0)));
    }

    #[test]
    fn registry_closure() {
        assert!(matches!(
            over("__import__('os')", &[0.0]),
            Err(Error::InvalidExpression(_))
        ));
        assert!(matches!(over("y * 2", &[0.0]), Err(Error::InvalidExpression(_))));
    }

    #[test]
    fn failures_are_global() {
        // one bad element fails everything
        assert_eq!(over("1 / x", &[1.0, 0.0, 2.0]), Err(Error::DivisionByZero));
        assert!(matches!(over("sqrt(x)", &[4.0, -1.0]), Err(Error::DomainError(_))));
        assert!(matches!(over("log(x)", &[1.0, 0.0]), Err(Error::DomainError(_))));
        assert!(matches!(over("exp(x)", &[1.0, 1000.0]), Err(Error::Overflow(_))));
        assert!(matches!(over("x ** 0.5", &[-1.0]), Err(Error::DomainError(_))));
        assert!(matches!(over("x * 1e308", &[10.0]), Err(Error::Overflow(_))));
        assert!(matches!(over("1e400", &[0.0, 1.0]), Err(Error::Overflow(_))));
    }

    #[test]
    fn reusable() {
        let expr = Expr::parse("3 / x + 1").unwrap();
        assert_eq!(expr.eval_at(1.0), Ok(4.0));
        assert_eq!(expr.eval_at(3.0), Ok(2.0));
        assert_eq!(expr.eval_at(0.0), Err(Error::DivisionByZero));
    }
}
