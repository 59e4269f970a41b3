//! Arithmetic, exponent, logarithm and modular arithmetic operations.
//!
//! Each operation is a pure function of its operands. [`execute`] dispatches
//! a [`CalculatorRequest`] and returns an [`Outcome`] whose `Display` is the
//! message shown to the user.

use crate::checked;
use crate::error::Error;
use crate::token::Op;
use std::fmt::{self, Display, Formatter};
use tracing::trace;

/// The four basic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a × b`
    Mul,
    /// `a ÷ b`, failing on a zero divisor
    Div,
}

impl ArithmeticOp {
    /// Symbol used in result messages
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "×",
            Self::Div => "÷",
        }
    }
}

/// One user action of the calculator
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub enum CalculatorRequest {
    /// `a op b`
    Arithmetic { a: f64, b: f64, op: ArithmeticOp },
    /// `base ^ exponent`
    Power { base: f64, exponent: f64 },
    /// Logarithm of `value` in `base`
    Logarithm { value: f64, base: f64 },
    /// `a mod n`, with `n >= 1`
    Remainder { a: i64, n: i64 },
    /// Whether `a ≡ b (mod n)`, with `n >= 1`
    Congruence { a: i64, b: i64, n: i64 },
}

/// Result of a congruence test `a ≡ b (mod n)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Congruence {
    /// Left operand
    pub a: i64,
    /// Right operand
    pub b: i64,
    /// Modulus
    pub n: i64,
    /// `a mod n == b mod n`
    pub holds: bool,
    /// `a mod n`
    pub a_mod: i64,
    /// `b mod n`
    pub b_mod: i64,
}

/// Successful result of a [`CalculatorRequest`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub enum Outcome {
    /// Operands and result of an [`ArithmeticOp`]
    Arithmetic {
        a: f64,
        b: f64,
        op: ArithmeticOp,
        result: f64,
    },
    /// Operands and result of a power
    Power {
        base: f64,
        exponent: f64,
        result: f64,
    },
    /// Operands and result of a logarithm
    Logarithm {
        value: f64,
        base: f64,
        result: f64,
    },
    /// Floor-mod remainder, in `0..n`
    Remainder {
        a: i64,
        n: i64,
        result: i64,
    },
    /// Congruence test with both residues
    Congruence(Congruence),
}

impl Outcome {
    /// `false` only for a congruence that does not hold
    pub fn is_positive(&self) -> bool {
        match self {
            Self::Congruence(congruence) => congruence.holds,
            _ => true,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match *self {
            Self::Arithmetic { a, b, op, result } => write!(
                fmt,
                "{} {} {} = {}",
                Real(a),
                op.symbol(),
                Real(b),
                Real(result)
            ),
            Self::Power {
                base,
                exponent,
                result,
            } => write!(
                fmt,
                "{} ^ {} = {}",
                Real(base),
                Real(exponent),
                Real(result)
            ),
            Self::Logarithm {
                value,
                base,
                result,
            } => write!(
                fmt,
                "log_{}({}) = {}",
                Real(base),
                Real(value),
                Real(result)
            ),
            Self::Remainder { a, n, result } => write!(fmt, "{} mod {} = {}", a, n, result),
            Self::Congruence(c) => write!(
                fmt,
                "{} ≡ {} (mod {}) is {} (a mod n = {}, b mod n = {})",
                c.a, c.b, c.n, c.holds, c.a_mod, c.b_mod
            ),
        }
    }
}

/// Displays integral values with a trailing `.0`, so that results read as
/// reals: `8.0` rather than `8`. Very large and very small magnitudes switch
/// to scientific notation with a signed two digit exponent, `1e+20`.
struct Real(f64);

impl Display for Real {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        let magnitude = self.0.abs();
        if magnitude >= 1e16 || (magnitude != 0.0 && magnitude < 1e-4) {
            let scientific = format!("{:e}", self.0);
            match scientific.split_once('e') {
                Some((mantissa, exponent)) => {
                    let (sign, digits) = match exponent.strip_prefix('-') {
                        Some(digits) => ('-', digits),
                        None => ('+', exponent),
                    };
                    write!(fmt, "{}e{}{:0>2}", mantissa, sign, digits)
                }
                None => write!(fmt, "{}", scientific),
            }
        } else if self.0.fract() == 0.0 {
            write!(fmt, "{:.1}", self.0)
        } else {
            write!(fmt, "{}", self.0)
        }
    }
}

/// Run a calculator request
///
/// # Example
///
/// ```
/// # use calcplot::calculator::{execute, ArithmeticOp, CalculatorRequest};
/// let outcome = execute(&CalculatorRequest::Arithmetic { a: 7.0, b: 2.0, op: ArithmeticOp::Div }).unwrap();
/// assert_eq!(outcome.to_string(), "7.0 ÷ 2.0 = 3.5");
/// ```
pub fn execute(request: &CalculatorRequest) -> Result<Outcome, Error> {
    trace!(?request, "calculator request");
    let outcome = match *request {
        CalculatorRequest::Arithmetic { a, b, op } => Outcome::Arithmetic {
            a,
            b,
            op,
            result: arithmetic(a, b, op)?,
        },
        CalculatorRequest::Power { base, exponent } => Outcome::Power {
            base,
            exponent,
            result: power(base, exponent)?,
        },
        CalculatorRequest::Logarithm { value, base } => Outcome::Logarithm {
            value,
            base,
            result: logarithm(value, base)?,
        },
        CalculatorRequest::Remainder { a, n } => Outcome::Remainder {
            a,
            n,
            result: remainder(a, n)?,
        },
        CalculatorRequest::Congruence { a, b, n } => Outcome::Congruence(congruence(a, b, n)?),
    };
    Ok(outcome)
}

fn finite_operand(name: &str, value: f64) -> Result<f64, Error> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::DomainError(format!(
            "{} must be a finite number, got {}",
            name, value
        )))
    }
}

/// `a op b`
pub fn arithmetic(a: f64, b: f64, op: ArithmeticOp) -> Result<f64, Error> {
    let a = finite_operand("a", a)?;
    let b = finite_operand("b", b)?;
    let op = match op {
        ArithmeticOp::Add => Op::Plus,
        ArithmeticOp::Sub => Op::Minus,
        ArithmeticOp::Mul => Op::Mul,
        ArithmeticOp::Div => Op::Div,
    };
    checked::binary(op, a, b)
}

/// `base ^ exponent`
pub fn power(base: f64, exponent: f64) -> Result<f64, Error> {
    let base = finite_operand("base", base)?;
    let exponent = finite_operand("exponent", exponent)?;
    checked::pow(base, exponent).map_err(|err| match err {
        Error::Overflow(_) => Error::Overflow("number too large to compute".into()),
        other => other,
    })
}

/// Logarithm of `value` in base `base`
pub fn logarithm(value: f64, base: f64) -> Result<f64, Error> {
    let value = finite_operand("value", value)?;
    let base = finite_operand("base", base)?;
    if value <= 0.0 {
        return Err(Error::DomainError("value must be greater than 0".into()));
    }
    if base <= 0.0 || base == 1.0 {
        return Err(Error::DomainError(
            "base must be greater than 0 and not equal to 1".into(),
        ));
    }
    checked::finite(libm::log(value) / libm::log(base), || {
        format!("log_{}({})", base, value)
    })
}

fn check_modulus(n: i64) -> Result<i64, Error> {
    if n < 1 {
        return Err(Error::DomainError(format!(
            "modulus must be a positive integer, got {}",
            n
        )));
    }
    Ok(n)
}

/// `a mod n` with the floor-division convention: the result lies in `[0, n)`
/// whatever the sign of `a`.
pub fn remainder(a: i64, n: i64) -> Result<i64, Error> {
    let n = check_modulus(n)?;
    Ok(a.rem_euclid(n))
}

/// Test `a ≡ b (mod n)`, that is `(a - b) mod n == 0`
pub fn congruence(a: i64, b: i64, n: i64) -> Result<Congruence, Error> {
    let n = check_modulus(n)?;
    // i128 keeps a - b from overflowing
    let holds = (i128::from(a) - i128::from(b)).rem_euclid(i128::from(n)) == 0;
    Ok(Congruence {
        a,
        b,
        n,
        holds,
        a_mod: a.rem_euclid(n),
        b_mod: b.rem_euclid(n),
    })
}
