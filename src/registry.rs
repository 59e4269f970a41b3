use crate::error::Error;
use hashbrown::HashMap;
use std::fmt::{self, Debug, Formatter};

/// Name of the single free variable an expression may reference. It is bound
/// per evaluation and is never part of a [`Registry`].
pub const VARIABLE: &str = "x";

/// Set of arguments a registry function accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// Every finite real
    All,
    /// `arg >= 0`
    NonNegative,
    /// `arg > 0`
    Positive,
}

impl Domain {
    /// Whether `arg` lies in the domain
    pub fn contains(self, arg: f64) -> bool {
        match self {
            Self::All => true,
            Self::NonNegative => arg >= 0.0,
            Self::Positive => arg > 0.0,
        }
    }
}

/// A unary, elementwise numeric function
#[derive(Clone, Copy)]
pub struct Function {
    /// Name the function is resolved by
    pub name: &'static str,
    /// Accepted arguments
    pub domain: Domain,
    func: fn(f64) -> f64,
}

impl Function {
    /// Apply the function to a single argument, checking its domain and the
    /// magnitude of the result.
    pub fn apply(&self, arg: f64) -> Result<f64, Error> {
        if !self.domain.contains(arg) {
            return Err(Error::DomainError(format!(
                "{}({}) is undefined",
                self.name, arg
            )));
        }
        let result = (self.func)(arg);
        if result.is_nan() {
            Err(Error::DomainError(format!(
                "{}({}) is undefined",
                self.name, arg
            )))
        } else if result.is_infinite() {
            Err(Error::Overflow(format!("{}({}) is too large", self.name, arg)))
        } else {
            Ok(result)
        }
    }
}

impl Debug for Function {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        write!(fmt, "Function({})", self.name)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// What an identifier resolves to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding {
    /// A scalar constant such as `pi`
    Constant(f64),
    /// A unary elementwise function such as `sin`
    Function(Function),
}

/// Closed mapping from identifiers to constants and functions. Names missing
/// from the registry cannot be referenced by an expression at all.
#[derive(Debug, Clone)]
pub struct Registry {
    bindings: HashMap<&'static str, Binding>,
}

lazy_static! {
    static ref DEFAULT: Registry = Registry::builtin();
}

impl Registry {
    /// An empty registry, for building restricted name sets
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// The standard set: `sin`, `cos`, `tan`, `exp`, `sqrt`, `log` (natural),
    /// `log10`, `abs`, `pi` and `e`.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.function("sin", Domain::All, f64::sin);
        registry.function("cos", Domain::All, f64::cos);
        registry.function("tan", Domain::All, f64::tan);
        registry.function("exp", Domain::All, f64::exp);
        registry.function("sqrt", Domain::NonNegative, f64::sqrt);
        registry.function("log", Domain::Positive, f64::ln);
        registry.function("log10", Domain::Positive, f64::log10);
        registry.function("abs", Domain::All, f64::abs);
        registry.constant("pi", std::f64::consts::PI);
        registry.constant("e", std::f64::consts::E);
        registry.bindings.shrink_to_fit();
        registry
    }

    /// Shared instance of [`Registry::builtin`]
    pub fn global() -> &'static Self {
        &DEFAULT
    }

    /// Add a function. Re-registering a name replaces the previous binding,
    /// so names stay unique.
    pub fn function(&mut self, name: &'static str, domain: Domain, func: fn(f64) -> f64) {
        debug_assert!(name != VARIABLE, "'{}' is reserved", VARIABLE);
        self.bindings
            .insert(name, Binding::Function(Function { name, domain, func }));
    }

    /// Add a constant
    pub fn constant(&mut self, name: &'static str, value: f64) {
        debug_assert!(name != VARIABLE, "'{}' is reserved", VARIABLE);
        self.bindings.insert(name, Binding::Constant(value));
    }

    /// Resolve a name, `None` if it is not registered. The free variable is
    /// not a binding and is never returned here.
    pub fn lookup(&self, name: &str) -> Option<Binding> {
        self.bindings.get(name).copied()
    }

    /// Every resolvable name, sorted, including the free variable
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.bindings.keys().copied().collect();
        names.push(VARIABLE);
        names.sort_unstable();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names() {
        assert_eq!(
            Registry::global().names(),
            vec!["abs", "cos", "e", "exp", "log", "log10", "pi", "sin", "sqrt", "tan", "x"]
        );
    }

    #[test]
    fn lookup() {
        let registry = Registry::global();
        assert_eq!(
            registry.lookup("pi"),
            Some(Binding::Constant(std::f64::consts::PI))
        );
        assert!(matches!(registry.lookup("sqrt"), Some(Binding::Function(f)) if f.name == "sqrt"));
        for name in &["x", "__import__", "eval", "open", "ln", "Sin", "print"] {
            assert_eq!(registry.lookup(name), None, "{} should not resolve", name);
        }
    }

    #[test]
    fn domains() {
        let registry = Registry::global();
        let apply = |name: &str, arg: f64| match registry.lookup(name) {
            Some(Binding::Function(f)) => f.apply(arg),
            other => panic!("{} is {:?}", name, other),
        };
        assert_eq!(apply("sqrt", 9.0), Ok(3.0));
        assert_eq!(apply("sqrt", 0.0), Ok(0.0));
        assert!(matches!(apply("sqrt", -1.0), Err(Error::DomainError(_))));
        assert!(matches!(apply("log", 0.0), Err(Error::DomainError(_))));
        assert!(matches!(apply("log10", -3.0), Err(Error::DomainError(_))));
        assert!(matches!(apply("exp", 1000.0), Err(Error::Overflow(_))));
        assert!((apply("log10", 1000.0).unwrap() - 3.0).abs() < 1e-12);
        assert_eq!(apply("abs", -2.5), Ok(2.5));
    }

    #[test]
    fn custom_registry() {
        let mut registry = Registry::empty();
        registry.constant("tau", std::f64::consts::TAU);
        assert_eq!(registry.names(), vec!["tau", "x"]);
        assert_eq!(registry.lookup("sin"), None);
    }
}
