use crate::checked;
use crate::error::Error;
use crate::registry::Function;
use crate::token::Op;

/// Ast nodes for the expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// The free variable `x`
    Variable,
    /// A constant value
    Value(f64),
    /// -<arg>
    Neg(Box<Ast>),
    /// <left> <op> <right>
    Binary(Op, Box<Ast>, Box<Ast>),
    /// fn(<arg>)
    Function(Function, Box<Ast>),
}

impl Ast {
    /// Build a binary node from its operands
    pub fn binary(op: Op, left: Ast, right: Ast) -> Self {
        Self::Binary(op, Box::new(left), Box::new(right))
    }

    /// If the AST node correspond to a constant, get `Some(constant)`. Else,
    /// get `None`
    pub fn value(&self) -> Option<f64> {
        if let Self::Value(value) = *self {
            Some(value)
        } else {
            None
        }
    }

    /// Check if the tree references `x` anywhere
    pub fn depends_on_variable(&self) -> bool {
        match self {
            Self::Variable => true,
            Self::Value(_) => false,
            Self::Neg(arg) | Self::Function(_, arg) => arg.depends_on_variable(),
            Self::Binary(_, left, right) => {
                left.depends_on_variable() || right.depends_on_variable()
            }
        }
    }

    /// Optimize the AST by doing constants propagation.
    ///
    /// Folding goes through the same checked arithmetic as evaluation, so a
    /// constant sub-expression such as `1/0` is reported here instead of
    /// being folded into `inf`.
    pub fn optimize(self) -> Result<Self, Error> {
        match self {
            Self::Variable | Self::Value(_) => Ok(self),
            Self::Neg(arg) => {
                let arg = arg.optimize()?;
                if let Some(arg) = arg.value() {
                    return Ok(Self::Value(-arg));
                }
                Ok(Self::Neg(Box::new(arg)))
            }
            Self::Function(func, arg) => {
                let arg = arg.optimize()?;
                if let Some(arg) = arg.value() {
                    return Ok(Self::Value(func.apply(arg)?));
                }
                Ok(Self::Function(func, Box::new(arg)))
            }
            Self::Binary(op, left, right) => {
                let left = left.optimize()?;
                let right = right.optimize()?;
                if let (Some(l), Some(r)) = (left.value(), right.value()) {
                    return Ok(Self::Value(checked::binary(op, l, r)?));
                }
                Ok(Self::binary(op, left, right))
            }
        }
    }
}
