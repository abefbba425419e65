//! # Symbolic Engine Module
//!
//! Prefix expression tree used by the differentiator. An expression is either a numeric
//! constant, a variable, a unary function application or a binary operation, all of them
//! tagged with an [`Op`] from the shared operator table.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Constants**: `Const(f64)`
//! - **Variables**: `Var(String)`
//! - **Functions**: `Func(Op, Box<Expr>)` - `sin`, `ln`, `sqrt` ...
//! - **Operations**: `BinOp(Op, Box<Expr>, Box<Expr>)` - `+`, `-`, `*`, `/`, `^`, `log` ...
//!
//! `Display` renders the S-expression `( op arg1 arg2 )`, [`Expr::to_infix`] renders the
//! conventional infix text with as few brackets as keep the meaning.
//!
//! ### Parsing
//! [`Expr::parse_expression`] runs the shared preprocess / validate / parse pipeline with a
//! [`PrefixBuilder`], which also records the variables in the order they first occur.
//!
//! ## Interesting Code Features
//!
//! 1. **Structural equality**: two subtrees are the "same" expression exactly when they
//!    compare equal, which is what the simplification rules rely on.
//! 2. **Operator Overloading**: `std::ops` traits build raw (unsimplified) trees, handy
//!    when writing rules and tests: `x.clone() * x`.
use crate::symbolic::errors::SyntaxError;
use crate::symbolic::operators::Op;
use crate::symbolic::parse_expr::{ExprParser, TreeBuilder};
use crate::symbolic::preprocess::preprocess;
use crate::symbolic::syntax_check::validate;
use crate::symbolic::utils::normalize_literal;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// names the evaluator resolves by itself, never reported as variables
pub const NAMED_CONSTANTS: [&str; 4] = ["pi", "euler", "true", "false"];

/// Prefix expression tree.
///
/// # Examples
/// ```rust, ignore
/// let e = Expr::BinOp(Op::Mul, Expr::Const(2.0).boxed(), Expr::Var("x".to_string()).boxed());
/// assert_eq!(e.to_string(), "( * 2 x )");
/// assert_eq!(e.to_infix(), "2*x");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Const(f64),
    Var(String),
    /// unary operator applied to its argument
    Func(Op, Box<Expr>),
    /// binary operator with its two arguments
    BinOp(Op, Box<Expr>, Box<Expr>),
}

static DOUBLED_SIGNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+\+|\+-|-\+|--").expect("static pattern"));

/// Collapses doubled signs left to right: `++`→`+`, `+-`→`-`, `-+`→`-`, `--`→`+`.
pub fn parse_signs(text: &str) -> String {
    DOUBLED_SIGNS
        .replace_all(text, |caps: &regex::Captures| match &caps[0] {
            "++" | "--" => "+",
            _ => "-",
        })
        .into_owned()
}

/// text form of a constant: integral values carry no fractional part, and no `-0`
pub fn format_constant(c: f64) -> String {
    if c == 0.0 {
        "0".to_string()
    } else {
        format!("{}", c)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Const(c) => write!(f, "{}", format_constant(*c)),
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Func(op, arg) => write!(f, "( {} {} )", op, arg),
            Expr::BinOp(op, lhs, rhs) => write!(f, "( {} {} {} )", op, lhs, rhs),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::BinOp(Op::Add, self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::BinOp(Op::Sub, self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::BinOp(Op::Mul, self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::BinOp(Op::Div, self.boxed(), rhs.boxed())
    }
}

impl Expr {
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::BinOp(Op::Pow, self.boxed(), rhs.boxed())
    }

    pub fn func(op: Op, arg: Expr) -> Expr {
        Expr::Func(op, arg.boxed())
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Expr::Const(_))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Expr::Var(_))
    }

    /// neither a constant nor a variable
    pub fn is_compound(&self) -> bool {
        !self.is_constant() && !self.is_variable()
    }

    pub fn constant(&self) -> Option<f64> {
        match self {
            Expr::Const(c) => Some(*c),
            _ => None,
        }
    }

    pub fn is_const_value(&self, value: f64) -> bool {
        self.constant() == Some(value)
    }

    /// operator at the root, if any
    pub fn op(&self) -> Option<Op> {
        match self {
            Expr::Func(op, _) | Expr::BinOp(op, _, _) => Some(*op),
            _ => None,
        }
    }

    pub fn is_op(&self, op: Op) -> bool {
        self.op() == Some(op)
    }

    /// first argument of a function or operation
    pub fn arg1(&self) -> Option<&Expr> {
        match self {
            Expr::Func(_, a) | Expr::BinOp(_, a, _) => Some(a),
            _ => None,
        }
    }

    /// second argument of a binary operation
    pub fn arg2(&self) -> Option<&Expr> {
        match self {
            Expr::BinOp(_, _, b) => Some(b),
            _ => None,
        }
    }

    /// does the variable occur anywhere in the tree
    pub fn contains_var(&self, var: &str) -> bool {
        match self {
            Expr::Const(_) => false,
            Expr::Var(name) => name == var,
            Expr::Func(_, a) => a.contains_var(var),
            Expr::BinOp(_, a, b) => a.contains_var(var) || b.contains_var(var),
        }
    }

    //___________________________________INFIX OUTPUT____________________________________

    /// Conventional infix text. Sub-expressions are bracketed only where dropping the
    /// brackets would change the meaning (or the reading) of the result.
    pub fn to_infix(&self) -> String {
        match self {
            Expr::Const(c) => format_constant(*c),
            Expr::Var(name) => name.clone(),
            Expr::Func(op, arg) => format!("{}({})", op, arg.to_infix()),
            Expr::BinOp(op, lhs, rhs) => {
                let left = if lhs.needs_brackets_on_left_of(*op) {
                    format!("({})", lhs.to_infix())
                } else {
                    lhs.to_infix()
                };
                let right = if rhs.needs_brackets_on_right_of(*op) {
                    format!("({})", rhs.to_infix())
                } else {
                    rhs.to_infix()
                };
                format!("{}{}{}", left, op, right)
            }
        }
    }

    fn needs_brackets_on_left_of(&self, parent: Op) -> bool {
        match self {
            Expr::Const(c) => *c < 0.0 && matches!(parent, Op::Pow | Op::Log),
            Expr::BinOp(op, _, _) => {
                !(matches!(parent, Op::Add | Op::Sub) && op.precedence() <= parent.precedence())
            }
            _ => false,
        }
    }

    fn needs_brackets_on_right_of(&self, parent: Op) -> bool {
        let Expr::BinOp(op, _, _) = self else {
            return false;
        };
        match parent {
            Op::Add => op.precedence() > parent.precedence(),
            Op::Sub => op.precedence() >= parent.precedence(),
            Op::Mul => !matches!(op, Op::Pow | Op::Mul),
            _ => true,
        }
    }

    //___________________________________PARSING____________________________________

    /// Parses infix text into a prefix tree. Returns the tree and the variables in the
    /// order they first occur, named constants left out.
    pub fn parse_expression(text: &str, max_depth: usize) -> Result<(Expr, Vec<String>), SyntaxError> {
        let prepared = preprocess(text);
        validate(&prepared)?;
        let mut builder = PrefixBuilder::default();
        let expr = ExprParser::new(&mut builder, max_depth).parse(&prepared)?;
        Ok((expr, builder.variables))
    }
}

/// Builds prefix trees and keeps the variable-occurrence list.
#[derive(Debug, Default)]
pub struct PrefixBuilder {
    pub variables: Vec<String>,
}

impl TreeBuilder for PrefixBuilder {
    type Tree = Expr;

    fn constant(&mut self, literal: &str) -> Result<Expr, SyntaxError> {
        normalize_literal(literal)
            .parse::<f64>()
            .map(Expr::Const)
            .map_err(|_| SyntaxError::InvalidNumber(literal.to_string()))
    }

    fn variable(&mut self, name: &str) -> Expr {
        if !NAMED_CONSTANTS.contains(&name) && !self.variables.iter().any(|v| v == name) {
            self.variables.push(name.to_string());
        }
        Expr::Var(name.to_string())
    }

    fn unary(&mut self, op: Op, arg: Expr) -> Expr {
        Expr::Func(op, arg.boxed())
    }

    fn binary(&mut self, op: Op, lhs: Expr, rhs: Expr) -> Expr {
        Expr::BinOp(op, lhs.boxed(), rhs.boxed())
    }

    fn zero(&mut self) -> Expr {
        Expr::Const(0.0)
    }
}
