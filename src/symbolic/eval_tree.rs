//! # Tree evaluator
//!
//! Binary parse tree of the evaluator and its post-order reduction to a decimal value.
//! Parsed trees are memoized by normalized text (whitespace removed, lower-cased), so the
//! same expression evaluated with different bindings is parsed once. The cache grows for
//! the lifetime of the evaluator; there is no eviction.
use crate::symbolic::big_math::{self, AngleUnit, EULER, MathContext, PI};
use crate::symbolic::errors::{EvalError, SyntaxError};
use crate::symbolic::operators::Op;
use crate::symbolic::parse_expr::parse_with_depth;
use crate::symbolic::preprocess::{insert_implicit_multiplication, normalize, rewrite_scientific};
use crate::symbolic::syntax_check::validate;
use crate::symbolic::utils::normalize_literal;
use bigdecimal::BigDecimal;
use log::{debug, info};
use num_traits::{One, Signed, Zero};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Constant(BigDecimal),
    Variable(String),
    /// `right` is present exactly for two-argument operators
    Expression {
        op: Op,
        left: Box<Node>,
        right: Option<Box<Node>>,
    },
}

impl Node {
    pub fn depth(&self) -> usize {
        match self {
            Node::Constant(_) | Node::Variable(_) => 1,
            Node::Expression { left, right, .. } => {
                1 + left.depth().max(right.as_ref().map_or(0, |r| r.depth()))
            }
        }
    }

    /// variable names in left-to-right order, with repetitions
    pub fn variables(&self) -> Vec<String> {
        match self {
            Node::Constant(_) => Vec::new(),
            Node::Variable(name) => vec![name.clone()],
            Node::Expression { left, right, .. } => {
                let mut vars = left.variables();
                if let Some(right) = right {
                    vars.extend(right.variables());
                }
                vars
            }
        }
    }
}

/// fully bracketed infix form, parseable again
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Constant(value) => {
                if value.is_negative() {
                    write!(f, "({})", value)
                } else {
                    write!(f, "{}", value)
                }
            }
            Node::Variable(name) => write!(f, "{}", name),
            Node::Expression { op, left, right: Some(right) } => write!(f, "({}{}{})", left, op, right),
            Node::Expression { op, left, right: None } => write!(f, "{}({})", op, left),
        }
    }
}

/// binding names in the form the parser produces for variables
fn normalized_names(bindings: &HashMap<String, String>) -> HashMap<String, String> {
    bindings
        .iter()
        .map(|(name, value)| (normalize(name), value.clone()))
        .collect()
}

fn truth(value: bool) -> BigDecimal {
    if value { BigDecimal::one() } else { BigDecimal::zero() }
}

fn is_true(value: &BigDecimal) -> bool {
    *value == BigDecimal::one()
}

pub struct Evaluator {
    ctx: MathContext,
    angle_unit: AngleUnit,
    max_depth: usize,
    constants: HashMap<String, BigDecimal>,
    trees: HashMap<String, Arc<Node>>,
    parse_count: usize,
}

impl Evaluator {
    pub fn new(ctx: MathContext, angle_unit: AngleUnit, max_depth: usize) -> Self {
        let constants = HashMap::from([
            ("pi".to_string(), PI.clone()),
            ("euler".to_string(), EULER.clone()),
            ("true".to_string(), BigDecimal::one()),
            ("false".to_string(), BigDecimal::zero()),
        ]);
        Evaluator {
            ctx,
            angle_unit,
            max_depth,
            constants,
            trees: HashMap::new(),
            parse_count: 0,
        }
    }

    pub fn set_angle_unit(&mut self, unit: AngleUnit) {
        self.angle_unit = unit;
    }

    pub fn angle_unit(&self) -> AngleUnit {
        self.angle_unit
    }

    /// number of times the parser ran, cache hits excluded
    pub fn parse_count(&self) -> usize {
        self.parse_count
    }

    pub fn cached_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn is_named_constant(&self, name: &str) -> bool {
        self.constants.contains_key(name)
    }

    /// Tree for `expression`, parsed on the first request and served from the cache after.
    pub fn tree_for(&mut self, expression: &str) -> Result<Arc<Node>, SyntaxError> {
        let key = normalize(expression);
        if key.is_empty() {
            return Err(SyntaxError::EmptyExpression);
        }
        if let Some(tree) = self.trees.get(&key) {
            debug!("tree cache hit for \"{}\"", key);
            return Ok(Arc::clone(tree));
        }
        let text = insert_implicit_multiplication(&rewrite_scientific(&key));
        validate(&text)?;
        self.parse_count += 1;
        let tree = Arc::new(parse_with_depth(&text, self.max_depth)?);
        debug!("parsed \"{}\" into {}", key, tree);
        self.trees.insert(key, Arc::clone(&tree));
        Ok(tree)
    }

    /// Evaluates text against `bindings`. Binding names are matched case-insensitively.
    pub fn evaluate_text(
        &mut self,
        expression: &str,
        bindings: &HashMap<String, String>,
    ) -> Result<BigDecimal, EvalError> {
        info!("evaluating \"{}\"", expression);
        let bindings = normalized_names(bindings);
        let mut resolving = Vec::new();
        self.evaluate_in(expression, &bindings, &mut resolving)
    }

    /// Reduces an already parsed tree. Binding names are matched case-insensitively.
    pub fn evaluate(
        &mut self,
        node: &Node,
        bindings: &HashMap<String, String>,
    ) -> Result<BigDecimal, EvalError> {
        let bindings = normalized_names(bindings);
        let mut resolving = Vec::new();
        self.evaluate_node(node, &bindings, &mut resolving)
    }

    fn evaluate_in(
        &mut self,
        expression: &str,
        bindings: &HashMap<String, String>,
        resolving: &mut Vec<String>,
    ) -> Result<BigDecimal, EvalError> {
        let tree = self.tree_for(expression)?;
        self.evaluate_node(&tree, bindings, resolving)
    }

    fn evaluate_node(
        &mut self,
        node: &Node,
        bindings: &HashMap<String, String>,
        resolving: &mut Vec<String>,
    ) -> Result<BigDecimal, EvalError> {
        match node {
            Node::Constant(value) => Ok(value.clone()),
            Node::Variable(name) => self.resolve_variable(name, bindings, resolving),
            Node::Expression { op, left, right } => {
                let a = self.evaluate_node(left, bindings, resolving)?;
                match (op.is_binary(), right) {
                    (true, Some(right)) => {
                        let b = self.evaluate_node(right, bindings, resolving)?;
                        self.apply_binary(*op, &a, &b)
                    }
                    (false, None) => self.apply_unary(*op, &a),
                    _ => Err(EvalError::UnknownOperator(op.to_string())),
                }
            }
        }
    }

    /// named constants first, then bindings; a bound text that is not a literal is
    /// evaluated in turn
    fn resolve_variable(
        &mut self,
        name: &str,
        bindings: &HashMap<String, String>,
        resolving: &mut Vec<String>,
    ) -> Result<BigDecimal, EvalError> {
        if let Some(value) = self.constants.get(name) {
            return Ok(value.clone());
        }
        let Some(bound) = bindings.get(name) else {
            return Err(EvalError::UnboundVariable(name.to_string()));
        };
        let bound = bound.trim();
        if let Ok(value) = BigDecimal::from_str(&normalize_literal(bound)) {
            return Ok(value);
        }
        if resolving.iter().any(|n| n == name) {
            return Err(EvalError::CyclicBinding(name.to_string()));
        }
        if resolving.len() >= self.max_depth {
            return Err(EvalError::RecursionLimitExceeded(self.max_depth));
        }
        debug!("resolving {} through \"{}\"", name, bound);
        resolving.push(name.to_string());
        let result = self.evaluate_in(bound, bindings, resolving);
        resolving.pop();
        result
    }

    fn apply_binary(&self, op: Op, a: &BigDecimal, b: &BigDecimal) -> Result<BigDecimal, EvalError> {
        let ctx = &self.ctx;
        let value = match op {
            Op::Add => a + b,
            Op::Sub => a - b,
            Op::Mul => a * b,
            Op::Div => big_math::divide(a, b, ctx)?,
            Op::Rem => big_math::remainder(a, b)?,
            Op::Pow => big_math::pow(a, b, ctx)?,
            Op::Log => big_math::log(a, b, ctx)?,
            Op::Lt => truth(a < b),
            Op::Gt => truth(a > b),
            Op::Le => truth(a <= b),
            Op::Ge => truth(a >= b),
            Op::Eq => truth(a == b),
            Op::Ne => truth(a != b),
            Op::And => truth(is_true(a) && is_true(b)),
            Op::Or => truth(is_true(a) || is_true(b)),
            other => return Err(EvalError::UnknownOperator(other.to_string())),
        };
        Ok(value)
    }

    fn apply_unary(&self, op: Op, a: &BigDecimal) -> Result<BigDecimal, EvalError> {
        use big_math as m;
        let ctx = &self.ctx;
        let arg = if op.takes_angle() {
            m::to_radians(a, self.angle_unit, ctx)?
        } else {
            a.clone()
        };
        let x = &arg;
        let value = match op {
            Op::Not => truth(!is_true(x)),
            Op::Sin => m::sin(x, ctx)?,
            Op::Cos => m::cos(x, ctx)?,
            Op::Tan => m::tan(x, ctx)?,
            Op::Cotan => m::cotan(x, ctx)?,
            Op::Sec => m::sec(x, ctx)?,
            Op::Csc => m::csc(x, ctx)?,
            Op::Exsec => m::exsec(x, ctx)?,
            Op::Vers => m::vers(x, ctx)?,
            Op::Covers => m::covers(x, ctx)?,
            Op::Hav => m::hav(x, ctx)?,
            Op::Sinc => m::sinc(x, ctx)?,
            Op::Asin => m::asin(x, ctx)?,
            Op::Acos => m::acos(x, ctx)?,
            Op::Atan => m::atan(x, ctx)?,
            Op::Acotan => m::acotan(x, ctx)?,
            Op::Asec => m::asec(x, ctx)?,
            Op::Acsc => m::acsc(x, ctx)?,
            Op::Aexsec => m::aexsec(x, ctx)?,
            Op::Avers => m::avers(x, ctx)?,
            Op::Acovers => m::acovers(x, ctx)?,
            Op::Ahav => m::ahav(x, ctx)?,
            Op::Sinh => m::sinh(x, ctx)?,
            Op::Cosh => m::cosh(x, ctx)?,
            Op::Tanh => m::tanh(x, ctx)?,
            Op::Coth => m::coth(x, ctx)?,
            Op::Sech => m::sech(x, ctx)?,
            Op::Csch => m::csch(x, ctx)?,
            Op::Asinh => m::asinh(x, ctx)?,
            Op::Acosh => m::acosh(x, ctx)?,
            Op::Atanh => m::atanh(x, ctx)?,
            Op::Acoth => m::acoth(x, ctx)?,
            Op::Asech => m::asech(x, ctx)?,
            Op::Acsch => m::acsch(x, ctx)?,
            Op::Exp => m::exp(x, ctx)?,
            Op::Ln => m::ln(x, ctx)?,
            Op::Sqrt => m::sqrt(x, ctx)?,
            Op::Abs => x.abs(),
            Op::Fpart => m::fpart(x),
            Op::Round => m::round(x),
            Op::Ceil => m::ceil(x),
            Op::Floor => m::floor(x),
            Op::Fac => m::fac(x)?,
            Op::Sfac => m::sfac(x)?,
            Op::Deg2rad => m::deg2rad(x, ctx)?,
            Op::Deg2grad => m::deg2grad(x, ctx)?,
            Op::Rad2deg => m::rad2deg(x, ctx)?,
            Op::Rad2grad => m::rad2grad(x, ctx)?,
            Op::Grad2deg => m::grad2deg(x, ctx)?,
            Op::Grad2rad => m::grad2rad(x, ctx)?,
            other => return Err(EvalError::UnknownOperator(other.to_string())),
        };
        if op.returns_angle() {
            return m::from_radians(&value, self.angle_unit, ctx).map_err(EvalError::from);
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_traits::ToPrimitive;

    fn evaluator() -> Evaluator {
        Evaluator::new(MathContext::default(), AngleUnit::Radians, 64)
    }

    fn d(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn eval(e: &str) -> Result<BigDecimal, EvalError> {
        evaluator().evaluate_text(e, &HashMap::new())
    }

    fn eval_f64(e: &str) -> f64 {
        eval(e).unwrap().to_f64().unwrap()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("2+3*4").unwrap(), d("14"));
        assert_eq!(eval("(2+3)*4").unwrap(), d("20"));
        assert_eq!(eval("10-4-3").unwrap(), d("3"));
        assert_eq!(eval("2^10").unwrap(), d("1024"));
        assert_eq!(eval("7%3").unwrap(), d("1"));
        assert_eq!(eval("-2^2").unwrap(), d("-4"));
        assert_eq!(eval("1/4").unwrap(), d("0.25"));
        assert_eq!(eval("1e-3").unwrap(), d("0.001"));
        assert_eq!(eval("2.5E2").unwrap(), d("250"));
    }

    #[test]
    fn test_logic() {
        assert_eq!(eval("3>2").unwrap(), d("1"));
        assert_eq!(eval("3<=2").unwrap(), d("0"));
        assert_eq!(eval("2==2&&1!=2").unwrap(), d("1"));
        assert_eq!(eval("false||true").unwrap(), d("1"));
        assert_eq!(eval("!true").unwrap(), d("0"));
        assert_eq!(eval("!(1>2)").unwrap(), d("1"));
    }

    #[test]
    fn test_functions() {
        assert_relative_eq!(eval_f64("sin(pi/2)"), 1.0, epsilon = 1e-15);
        assert_relative_eq!(eval_f64("ln(euler)"), 1.0, epsilon = 1e-15);
        assert_eq!(eval("sqrt(16)").unwrap(), d("4"));
        assert_eq!(eval("fac(5)").unwrap(), d("120"));
        assert_eq!(eval("abs(-3)").unwrap(), d("3"));
        assert_eq!(eval("floor(-2.5)").unwrap(), d("-3"));
        assert_relative_eq!(eval_f64("8log2"), 3.0, epsilon = 1e-12);
        assert_relative_eq!(eval_f64("rad2deg(pi)"), 180.0, epsilon = 1e-12);
    }

    #[test]
    fn test_errors() {
        assert_eq!(eval("1/0"), Err(EvalError::DivisionByZero));
        assert!(matches!(eval("asin(2)"), Err(EvalError::DomainError { ref op, .. }) if op == "asin"));
        assert!(matches!(eval("fac(-1)"), Err(EvalError::InvalidArgument { .. })));
        assert_eq!(eval("y+1"), Err(EvalError::UnboundVariable("y".to_string())));
        assert!(matches!(
            eval("(2+3"),
            Err(EvalError::Syntax(SyntaxError::UnbalancedParentheses(_)))
        ));
        assert_eq!(eval(""), Err(EvalError::Syntax(SyntaxError::EmptyExpression)));
    }

    #[test]
    fn test_bindings() {
        let mut ev = evaluator();
        let bindings = HashMap::from([
            ("X".to_string(), "1".to_string()),
            ("y".to_string(), "x*10".to_string()),
            ("z".to_string(), "pi".to_string()),
        ]);
        assert_eq!(ev.evaluate_text("2(3+x)", &bindings).unwrap(), d("8"));
        assert_eq!(ev.evaluate_text("y+x", &bindings).unwrap(), d("11"));
        assert_relative_eq!(
            ev.evaluate_text("cos(z)", &bindings).unwrap().to_f64().unwrap(),
            -1.0,
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_binding_cycle_fails() {
        let mut ev = evaluator();
        let bindings = HashMap::from([
            ("a".to_string(), "b+1".to_string()),
            ("b".to_string(), "a*2".to_string()),
        ]);
        assert!(matches!(ev.evaluate_text("a", &bindings), Err(EvalError::CyclicBinding(_))));
        let selfish = HashMap::from([("x".to_string(), "x+1".to_string())]);
        assert_eq!(
            ev.evaluate_text("x", &selfish),
            Err(EvalError::CyclicBinding("x".to_string()))
        );
    }

    #[test]
    fn test_cache_reuses_trees() {
        let mut ev = evaluator();
        let one = HashMap::from([("x".to_string(), "1".to_string())]);
        let five = HashMap::from([("x".to_string(), "5".to_string())]);
        assert_eq!(ev.evaluate_text("x*2", &one).unwrap(), d("2"));
        assert_eq!(ev.parse_count(), 1);
        assert_eq!(ev.evaluate_text(" X * 2 ", &five).unwrap(), d("10"));
        assert_eq!(ev.parse_count(), 1);
        assert_eq!(ev.cached_trees(), 1);
        ev.evaluate_text("x*3", &five).unwrap();
        assert_eq!(ev.parse_count(), 2);
    }

    #[test]
    fn test_angle_units() {
        let mut ev = evaluator();
        ev.set_angle_unit(AngleUnit::Degrees);
        let none = HashMap::new();
        assert_relative_eq!(ev.evaluate_text("sin(90)", &none).unwrap().to_f64().unwrap(), 1.0, epsilon = 1e-15);
        assert_relative_eq!(ev.evaluate_text("asin(1)", &none).unwrap().to_f64().unwrap(), 90.0, epsilon = 1e-12);
        // hyperbolic functions ignore the angle unit
        assert_relative_eq!(ev.evaluate_text("sinh(1)", &none).unwrap().to_f64().unwrap(), 1f64.sinh(), epsilon = 1e-15);
        ev.set_angle_unit(AngleUnit::Gradians);
        assert_relative_eq!(ev.evaluate_text("cos(200)", &none).unwrap().to_f64().unwrap(), -1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_display_reparses() {
        let mut ev = evaluator();
        let tree = ev.tree_for("2*-3+sin(x)^2").unwrap();
        let printed = tree.to_string();
        let bindings = HashMap::from([("x".to_string(), "0.3".to_string())]);
        let direct = ev.evaluate(&tree, &bindings).unwrap();
        let again = ev.evaluate_text(&printed, &bindings).unwrap();
        assert_eq!(direct, again);
        assert_eq!(tree.variables(), vec!["x".to_string()]);
        assert_eq!(tree.depth(), 4);
    }

    #[test]
    fn test_parsed_trees_match_binding_names_case_insensitively() {
        let mut ev = evaluator();
        let tree = ev.tree_for("x*y").unwrap();
        let bindings = HashMap::from([
            ("X".to_string(), "3".to_string()),
            (" Y ".to_string(), "X+1".to_string()),
        ]);
        assert_eq!(ev.evaluate(&tree, &bindings).unwrap(), d("12"));
        assert_eq!(ev.evaluate_text("x*y", &bindings).unwrap(), d("12"));
    }

    #[test]
    fn test_long_flat_chains_fail_instead_of_overflowing() {
        let mut ev = evaluator();
        let long_sum = vec!["1"; 200_000].join("+");
        assert_eq!(
            ev.evaluate_text(&long_sum, &HashMap::new()),
            Err(EvalError::RecursionLimitExceeded(64))
        );
        assert_eq!(ev.evaluate_text(&vec!["1"; 60].join("+"), &HashMap::new()).unwrap(), d("60"));
    }
}
