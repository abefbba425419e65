//! # Symbolic Engine Derivatives Module
//!
//! Analytical differentiation of prefix trees and the text-to-text differentiation
//! pipeline built on top of it.
//!
//! ## Key Methods
//!
//! - [`Expr::diff`] - partial derivative of a tree with respect to one variable, assembled
//!   through the simplifying constructors so that trivial factors never appear
//! - [`Differentiator::differentiate`] - infix text in, one infix derivative per variable out
//!
//! ## Rules
//!
//! Sum, difference, product and quotient rules; the power rule for a constant exponent,
//! logarithmic differentiation for a variable exponent and `a^g` for a constant base;
//! the chain rule through every differentiable unary function. `sinc` and the binary
//! `log` are differentiated through their quotient forms `sin(u)/u` and `ln(a)/ln(b)`.
//! Rounding, factorials, `%`, comparisons and boolean operators have no derivative: a
//! subtree built from them that depends on the variable is an error, one that does not is
//! a constant.
use crate::symbolic::errors::SyntaxError;
use crate::symbolic::operators::Op;
use crate::symbolic::preprocess::normalize;
use crate::symbolic::symbolic_engine::{Expr, NAMED_CONSTANTS, parse_signs};
use crate::symbolic::syntax_check::validate;
use crate::symbolic::utils::is_variable;
use crate::Utils::task_parser::parse_variable_list;
use log::debug;
use std::f64::consts::PI;

fn c(value: f64) -> Expr {
    Expr::Const(value)
}

fn square(e: &Expr) -> Expr {
    Expr::make_power(e.clone(), c(2.0))
}

fn negated(e: Expr) -> Expr {
    Expr::make_product(c(-1.0), e)
}

/// `f(u)` through the simplifying constructor
fn call(op: Op, u: &Expr) -> Expr {
    Expr::make_func(op, u.clone())
}

/// `sqrt(u^2 - 1)`
fn sqrt_of_square_minus_one(u: &Expr) -> Expr {
    Expr::make_sqrt(Expr::make_subtraction(square(u), c(1.0)))
}

/// `sqrt(1 - u^2)`
fn sqrt_of_one_minus_square(u: &Expr) -> Expr {
    Expr::make_sqrt(Expr::make_subtraction(c(1.0), square(u)))
}

/// `sqrt(2u - u^2)`
fn sqrt_of_versine_span(u: &Expr) -> Expr {
    Expr::make_sqrt(Expr::make_subtraction(
        Expr::make_product(c(2.0), u.clone()),
        square(u),
    ))
}

/// radians (or degrees, gradians) per unit of the input of an angle conversion
fn conversion_factor(op: Op) -> Option<f64> {
    match op {
        Op::Deg2rad => Some(PI / 180.0),
        Op::Deg2grad => Some(200.0 / 180.0),
        Op::Rad2deg => Some(180.0 / PI),
        Op::Rad2grad => Some(200.0 / PI),
        Op::Grad2deg => Some(180.0 / 200.0),
        Op::Grad2rad => Some(PI / 200.0),
        _ => None,
    }
}

impl Expr {
    /// Partial derivative with respect to `var`.
    pub fn diff(&self, var: &str) -> Result<Expr, SyntaxError> {
        match self {
            Expr::Const(_) => Ok(c(0.0)),
            Expr::Var(name) => Ok(c(if name == var { 1.0 } else { 0.0 })),
            Expr::BinOp(op, a, b) => self.diff_binary(*op, a, b, var),
            Expr::Func(op, u) => self.diff_func(*op, u, var),
        }
    }

    fn not_differentiable(&self, op: Op, var: &str) -> Result<Expr, SyntaxError> {
        if self.contains_var(var) {
            Err(SyntaxError::NotDifferentiable(op.to_string()))
        } else {
            Ok(c(0.0))
        }
    }

    fn diff_binary(&self, op: Op, a: &Expr, b: &Expr, var: &str) -> Result<Expr, SyntaxError> {
        let derivative = match op {
            Op::Add => Expr::make_sum(a.diff(var)?, b.diff(var)?),
            Op::Sub => Expr::make_subtraction(a.diff(var)?, b.diff(var)?),
            Op::Mul => Expr::make_sum(
                Expr::make_product(a.clone(), b.diff(var)?),
                Expr::make_product(a.diff(var)?, b.clone()),
            ),
            Op::Div => Expr::make_division(
                Expr::make_subtraction(
                    Expr::make_product(b.clone(), a.diff(var)?),
                    Expr::make_product(a.clone(), b.diff(var)?),
                ),
                square(b),
            ),
            Op::Pow => self.diff_power(a, b, var)?,
            Op::Log => {
                let quotient = Expr::BinOp(
                    Op::Div,
                    Expr::func(Op::Ln, a.clone()).boxed(),
                    Expr::func(Op::Ln, b.clone()).boxed(),
                );
                quotient.diff(var)?
            }
            _ => return self.not_differentiable(op, var),
        };
        Ok(derivative)
    }

    fn diff_power(&self, base: &Expr, exponent: &Expr, var: &str) -> Result<Expr, SyntaxError> {
        if base.is_constant() {
            // a^g => ln(a) * g' * a^g
            return Ok(Expr::make_product(
                Expr::make_product(call(Op::Ln, base), exponent.diff(var)?),
                self.clone(),
            ));
        }
        if exponent.is_constant() {
            // f^n => f' * n * f^(n-1)
            return Ok(Expr::make_product(
                base.diff(var)?,
                Expr::make_product(
                    exponent.clone(),
                    Expr::make_power(
                        base.clone(),
                        Expr::make_subtraction(exponent.clone(), c(1.0)),
                    ),
                ),
            ));
        }
        // f^g => f^g * (g' * ln(f) + (ln f)' * g)
        let ln_base = call(Op::Ln, base);
        Ok(Expr::make_product(
            self.clone(),
            Expr::make_sum(
                Expr::make_product(exponent.diff(var)?, ln_base.clone()),
                Expr::make_product(ln_base.diff(var)?, exponent.clone()),
            ),
        ))
    }

    fn diff_func(&self, op: Op, u: &Expr, var: &str) -> Result<Expr, SyntaxError> {
        if let Some(factor) = conversion_factor(op) {
            return Ok(Expr::make_product(u.diff(var)?, c(factor)));
        }
        if op == Op::Sinc {
            let quotient = Expr::BinOp(Op::Div, Expr::func(Op::Sin, u.clone()).boxed(), u.clone().boxed());
            return quotient.diff(var);
        }
        let d = u.diff(var)?;
        let derivative = match op {
            // trigonometric
            Op::Sin => Expr::make_product(d, call(Op::Cos, u)),
            Op::Cos => Expr::make_product(d, negated(call(Op::Sin, u))),
            Op::Tan => Expr::make_product(d, Expr::make_sum(c(1.0), square(&call(Op::Tan, u)))),
            Op::Cotan => Expr::make_product(
                d,
                Expr::make_subtraction(c(-1.0), square(&call(Op::Cotan, u))),
            ),
            Op::Sec | Op::Exsec => Expr::make_product(
                d,
                Expr::make_product(call(Op::Sec, u), call(Op::Tan, u)),
            ),
            Op::Csc => Expr::make_product(
                d,
                negated(Expr::make_product(call(Op::Csc, u), call(Op::Cotan, u))),
            ),
            Op::Vers => Expr::make_product(d, call(Op::Sin, u)),
            Op::Covers => Expr::make_product(d, negated(call(Op::Cos, u))),
            Op::Hav => Expr::make_product(d, Expr::make_division(call(Op::Sin, u), c(2.0))),
            // inverse trigonometric
            Op::Asin => Expr::make_division(d, sqrt_of_one_minus_square(u)),
            Op::Acos => negated(Expr::make_division(d, sqrt_of_one_minus_square(u))),
            Op::Atan => Expr::make_division(d, Expr::make_sum(c(1.0), square(u))),
            Op::Acotan => Expr::make_division(negated(d), Expr::make_sum(c(1.0), square(u))),
            Op::Asec => Expr::make_division(
                d,
                Expr::make_product(call(Op::Abs, u), sqrt_of_square_minus_one(u)),
            ),
            Op::Acsc => negated(Expr::make_division(
                d,
                Expr::make_product(call(Op::Abs, u), sqrt_of_square_minus_one(u)),
            )),
            Op::Aexsec => {
                let w = Expr::make_sum(u.clone(), c(1.0));
                Expr::make_division(
                    d,
                    Expr::make_product(call(Op::Abs, &w), sqrt_of_square_minus_one(&w)),
                )
            }
            Op::Avers => Expr::make_division(d, sqrt_of_versine_span(u)),
            Op::Acovers => negated(Expr::make_division(d, sqrt_of_versine_span(u))),
            Op::Ahav => Expr::make_division(
                d,
                Expr::make_sqrt(Expr::make_subtraction(u.clone(), square(u))),
            ),
            // hyperbolic
            Op::Sinh => Expr::make_product(d, call(Op::Cosh, u)),
            Op::Cosh => Expr::make_product(d, call(Op::Sinh, u)),
            Op::Tanh => Expr::make_product(
                d,
                Expr::make_subtraction(c(1.0), square(&call(Op::Tanh, u))),
            ),
            Op::Coth => Expr::make_product(
                d,
                Expr::make_subtraction(c(1.0), square(&call(Op::Coth, u))),
            ),
            Op::Sech => Expr::make_product(
                d,
                negated(Expr::make_product(call(Op::Sech, u), call(Op::Tanh, u))),
            ),
            Op::Csch => Expr::make_product(
                d,
                negated(Expr::make_product(call(Op::Csch, u), call(Op::Coth, u))),
            ),
            Op::Asinh => Expr::make_division(
                d,
                Expr::make_sqrt(Expr::make_sum(square(u), c(1.0))),
            ),
            Op::Acosh => Expr::make_division(d, sqrt_of_square_minus_one(u)),
            Op::Atanh | Op::Acoth => {
                Expr::make_division(d, Expr::make_subtraction(c(1.0), square(u)))
            }
            Op::Asech => negated(Expr::make_division(
                d,
                Expr::make_product(u.clone(), sqrt_of_one_minus_square(u)),
            )),
            Op::Acsch => negated(Expr::make_division(
                d,
                Expr::make_product(
                    call(Op::Abs, u),
                    Expr::make_sqrt(Expr::make_sum(c(1.0), square(u))),
                ),
            )),
            // exponential, logarithm, roots
            Op::Exp => Expr::make_product(d, call(Op::Exp, u)),
            Op::Ln => Expr::make_product(d, Expr::make_division(c(1.0), u.clone())),
            Op::Sqrt => Expr::make_division(
                d,
                Expr::make_product(c(2.0), Expr::make_sqrt(u.clone())),
            ),
            Op::Abs => Expr::make_product(d, Expr::make_division(u.clone(), call(Op::Abs, u))),
            _ => return self.not_differentiable(op, var),
        };
        Ok(derivative)
    }
}

//___________________________________PIPELINE____________________________________

/// Text in, derivatives out.
///
/// # Examples
/// ```rust, ignore
/// let d = Differentiator::default();
/// assert_eq!(d.differentiate("cos(x-y)", "x;y").unwrap(), vec!["-1*sin(x-y)", "sin(x-y)"]);
/// ```
#[derive(Debug, Clone)]
pub struct Differentiator {
    pub max_depth: usize,
    pub simplify_passes: usize,
    /// variable used when neither the caller nor the expression names one
    pub default_variable: String,
}

impl Default for Differentiator {
    fn default() -> Self {
        Self {
            max_depth: crate::symbolic::parse_expr::DEFAULT_MAX_DEPTH,
            simplify_passes: 64,
            default_variable: "x".to_string(),
        }
    }
}

impl Differentiator {
    pub fn new(max_depth: usize, simplify_passes: usize, default_variable: &str) -> Self {
        Self {
            max_depth,
            simplify_passes,
            default_variable: default_variable.to_string(),
        }
    }

    /// Derivatives of `expression` with respect to each of the `;`-separated `variables`,
    /// or to every variable of the expression in order of first occurrence when
    /// `variables` is blank.
    pub fn differentiate(&self, expression: &str, variables: &str) -> Result<Vec<String>, SyntaxError> {
        let (tree, occurring) = Expr::parse_expression(expression, self.max_depth)?;
        let tree = tree.simplify_fixpoint(self.simplify_passes);

        let names = if normalize(variables).is_empty() {
            if occurring.is_empty() {
                vec![self.default_variable.clone()]
            } else {
                occurring
            }
        } else {
            parse_variable_list(variables)?
        };

        names
            .iter()
            .map(|name| {
                let name = checked_variable(name)?;
                let derivative = tree.diff(&name)?.simplify_fixpoint(self.simplify_passes);
                let text = parse_signs(&derivative.to_infix());
                debug!("d/d{} {} = {}", name, expression, text);
                Ok(text)
            })
            .collect()
    }
}

/// a differentiation variable must be a variable name that is not a named constant
fn checked_variable(name: &str) -> Result<String, SyntaxError> {
    let name = normalize(name);
    let chars: Vec<char> = name.chars().collect();
    if validate(&name).is_err() || !is_variable(&chars) || NAMED_CONSTANTS.contains(&name.as_str()) {
        return Err(SyntaxError::InvalidVariable(name));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::var("x")
    }

    fn d_dx(text: &str) -> String {
        let d = Differentiator::default();
        let mut out = d.differentiate(text, "x").unwrap();
        out.remove(0)
    }

    #[test]
    fn test_basic_rules() {
        assert_eq!(d_dx("x^2"), "2*x");
        assert_eq!(d_dx("sin(x)"), "cos(x)");
        assert_eq!(d_dx("5"), "0");
        assert_eq!(d_dx("x"), "1");
        assert_eq!(d_dx("3*x"), "3");
        assert_eq!(d_dx("x+x"), "2");
        assert_eq!(d_dx("exp(x)"), "exp(x)");
        assert_eq!(d_dx("ln(x)"), "1/x");
        assert_eq!(d_dx("cos(x)"), "-1*sin(x)");
    }

    #[test]
    fn test_partial_derivatives() {
        let d = Differentiator::default();
        assert_eq!(
            d.differentiate("cos(x-y)", "x;y").unwrap(),
            vec!["-1*sin(x-y)".to_string(), "sin(x-y)".to_string()]
        );
        assert_eq!(d.differentiate("x*y", "x").unwrap(), vec!["y".to_string()]);
    }

    #[test]
    fn test_variables_from_expression() {
        let d = Differentiator::default();
        let all = d.differentiate("x*y+pi", "").unwrap();
        assert_eq!(all, vec!["y".to_string(), "x".to_string()]);
        // constants fall back to the default variable
        assert_eq!(d.differentiate("42", "").unwrap(), vec!["0".to_string()]);
    }

    #[test]
    fn test_invalid_variables() {
        let d = Differentiator::default();
        assert!(matches!(
            d.differentiate("x^2", "sin"),
            Err(SyntaxError::InvalidVariable(_))
        ));
        assert!(matches!(
            d.differentiate("x^2", "2"),
            Err(SyntaxError::InvalidVariable(_))
        ));
        for constant in ["pi", "PI", "euler", "true", "false"] {
            assert_eq!(
                d.differentiate("pi*x", constant),
                Err(SyntaxError::InvalidVariable(constant.to_lowercase()))
            );
        }
        assert!(matches!(
            d.differentiate("x^2", "x;pi"),
            Err(SyntaxError::InvalidVariable(_))
        ));
    }

    #[test]
    fn test_roots_of_squares_keep_their_sign() {
        let d = Differentiator::default();
        assert_eq!(d.differentiate("sqrt(x^2)", "x").unwrap(), vec!["x/abs(x)".to_string()]);
        assert_ne!(d.differentiate("(x^2)^0.5", "x").unwrap(), vec!["1".to_string()]);
    }

    #[test]
    fn test_not_differentiable() {
        let d = Differentiator::default();
        assert_eq!(
            d.differentiate("floor(x)", "x"),
            Err(SyntaxError::NotDifferentiable("floor".to_string()))
        );
        assert!(matches!(
            d.differentiate("x%2", "x"),
            Err(SyntaxError::NotDifferentiable(_))
        ));
        // a non-differentiable part that does not depend on the variable is a constant
        assert_eq!(d.differentiate("fac(3)*x", "x").unwrap(), vec!["fac(3)".to_string()]);
    }

    #[test]
    fn test_syntax_errors_propagate() {
        let d = Differentiator::default();
        assert!(matches!(
            d.differentiate("(x+1", "x"),
            Err(SyntaxError::UnbalancedParentheses(_))
        ));
    }

    #[test]
    fn test_power_rules() {
        // constant base
        let e = Expr::Const(2.0).pow(x());
        assert_eq!(
            e.diff("x").unwrap(),
            Expr::func(Op::Ln, Expr::Const(2.0)) * Expr::Const(2.0).pow(x())
        );
        // variable exponent
        let e = x().pow(x());
        let d = e.diff("x").unwrap().simplify_fixpoint(64);
        assert!(d.contains_var("x"));
        assert!(d.to_infix().contains("ln(x)"));
    }

    #[test]
    fn test_chain_rule() {
        let e = Expr::func(Op::Sin, Expr::Const(2.0) * x());
        assert_eq!(
            e.diff("x").unwrap(),
            Expr::Const(2.0) * Expr::func(Op::Cos, Expr::Const(2.0) * x())
        );
        let e = Expr::func(Op::Sqrt, x());
        assert_eq!(
            e.diff("x").unwrap(),
            Expr::Const(1.0) / (Expr::Const(2.0) * Expr::func(Op::Sqrt, x()))
        );
    }

    #[test]
    fn test_every_differentiable_function_has_a_rule() {
        let functions = [
            Op::Sin, Op::Cos, Op::Tan, Op::Cotan, Op::Sec, Op::Csc, Op::Exsec, Op::Vers,
            Op::Covers, Op::Hav, Op::Sinc, Op::Asin, Op::Acos, Op::Atan, Op::Acotan, Op::Asec,
            Op::Acsc, Op::Aexsec, Op::Avers, Op::Acovers, Op::Ahav, Op::Sinh, Op::Cosh,
            Op::Tanh, Op::Coth, Op::Sech, Op::Csch, Op::Asinh, Op::Acosh, Op::Atanh,
            Op::Acoth, Op::Asech, Op::Acsch, Op::Exp, Op::Ln, Op::Sqrt, Op::Abs, Op::Deg2rad,
            Op::Deg2grad, Op::Rad2deg, Op::Rad2grad, Op::Grad2deg, Op::Grad2rad,
        ];
        for op in functions {
            let d = Expr::func(op, x()).diff("x");
            assert!(d.is_ok(), "no rule for {}", op);
        }
        for op in [Op::Fac, Op::Sfac, Op::Floor, Op::Ceil, Op::Round, Op::Fpart, Op::Not] {
            assert!(Expr::func(op, x()).diff("x").is_err(), "{} should fail", op);
        }
    }
}
