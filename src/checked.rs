//! Floating point arithmetic that reports division by zero, domain errors and
//! overflow instead of producing `inf` or `NaN`.

use crate::error::Error;
use crate::token::Op;

/// Apply a binary operator to two finite operands
pub fn binary(op: Op, left: f64, right: f64) -> Result<f64, Error> {
    match op {
        Op::Plus => finite(left + right, || format!("{} + {}", left, right)),
        Op::Minus => finite(left - right, || format!("{} - {}", left, right)),
        Op::Mul => finite(left * right, || format!("{} * {}", left, right)),
        Op::Div => div(left, right),
        Op::Pow => pow(left, right),
    }
}

pub fn div(left: f64, right: f64) -> Result<f64, Error> {
    if right == 0.0 {
        return Err(Error::DivisionByZero);
    }
    finite(left / right, || format!("{} / {}", left, right))
}

/// `base ** exponent`, following the real-valued rules: zero cannot be raised
/// to a negative power and a negative base needs an integral exponent.
pub fn pow(base: f64, exponent: f64) -> Result<f64, Error> {
    if base == 0.0 && exponent < 0.0 {
        return Err(Error::DivisionByZero);
    }
    if base < 0.0 && exponent.fract() != 0.0 {
        return Err(Error::DomainError(format!(
            "{} ** {} is not a real number",
            base, exponent
        )));
    }
    finite(libm::pow(base, exponent), || {
        format!("{} ** {}", base, exponent)
    })
}

/// Turn a non-finite result into the matching error
pub fn finite(value: f64, describe: impl FnOnce() -> String) -> Result<f64, Error> {
    if value.is_nan() {
        Err(Error::DomainError(format!("{} is undefined", describe())))
    } else if value.is_infinite() {
        Err(Error::Overflow(format!("{} is too large", describe())))
    } else {
        Ok(value)
    }
}
