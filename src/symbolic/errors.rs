//! Error taxonomy of the expression engine.
//!
//! `SyntaxError` covers everything that can go wrong before a tree exists (or while a
//! prefix tree is being differentiated), `MathError` is what the numeric primitives report,
//! `EvalError` is what a caller of `Engine::evaluate` sees, and `ConfigError` comes from
//! loading an `EngineConfig`.
use bigdecimal::BigDecimal;
use thiserror::Error;

/// Malformed input, or input too deeply nested to handle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("empty expression")]
    EmptyExpression,
    #[error("non matching brackets in \"{0}\"")]
    UnbalancedParentheses(String),
    #[error("syntax error near -> {0}")]
    IllegalAdjacentOperators(String),
    #[error("illegal character '{ch}' near -> {near}")]
    IllegalCharacter { ch: char, near: String },
    #[error("missing operator in \"{0}\"")]
    MissingOperator(String),
    #[error("wrong number of arguments to operator {0}")]
    ArityMismatch(String),
    #[error("invalid number literal \"{0}\"")]
    InvalidNumber(String),
    #[error("not a valid variable: \"{0}\"")]
    InvalidVariable(String),
    #[error("operator {0} has no derivative rule")]
    NotDifferentiable(String),
    #[error("malformed binding \"{0}\"")]
    MalformedBinding(String),
    #[error("expression nesting exceeds {0} levels")]
    RecursionLimitExceeded(usize),
}

/// The parser reports through the same taxonomy.
pub type ParseError = SyntaxError;

/// Failures of the numeric primitives in `big_math`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("argument {value} is out of the domain of {op}")]
    DomainError { op: String, value: BigDecimal },
    #[error("{op} requires a non-negative integer argument, got {value}")]
    InvalidArgument { op: String, value: BigDecimal },
}

/// Everything `evaluate` can fail with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Syntax(SyntaxError),
    #[error("no value associated with variable \"{0}\"")]
    UnboundVariable(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("argument {value} is out of the domain of {op}")]
    DomainError { op: String, value: BigDecimal },
    #[error("{op} requires a non-negative integer argument, got {value}")]
    InvalidArgument { op: String, value: BigDecimal },
    #[error("unknown operator {0}")]
    UnknownOperator(String),
    #[error("binding of \"{0}\" refers back to itself")]
    CyclicBinding(String),
    #[error("expression nesting exceeds {0} levels")]
    RecursionLimitExceeded(usize),
}

/// Problems reading an engine configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse configuration: {0}")]
    Parse(String),
    #[error("unknown section \"{0}\"")]
    UnknownSection(String),
    #[error("unknown key \"{0}\" in section engine")]
    UnknownKey(String),
    #[error("invalid value \"{value}\" for key \"{key}\"")]
    InvalidValue { key: String, value: String },
}

impl From<SyntaxError> for EvalError {
    fn from(err: SyntaxError) -> Self {
        match err {
            SyntaxError::RecursionLimitExceeded(depth) => EvalError::RecursionLimitExceeded(depth),
            other => EvalError::Syntax(other),
        }
    }
}

impl From<MathError> for EvalError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::DivisionByZero => EvalError::DivisionByZero,
            MathError::DomainError { op, value } => EvalError::DomainError { op, value },
            MathError::InvalidArgument { op, value } => EvalError::InvalidArgument { op, value },
        }
    }
}

impl EvalError {
    /// true for the "expression too complex" condition, as opposed to malformed input
    pub fn is_recursion_limit(&self) -> bool {
        matches!(self, EvalError::RecursionLimitExceeded(_))
    }
}
