//! # Precedence parser
//!
//! Character-index driven parser working directly on preprocessed text, without a token
//! stream. At every position it recognizes a fully bracketed sub-expression, a numeric
//! literal, a variable, or an operator application. The argument of an operator extends
//! forward until an operator binding no tighter than it is met (precedence climbing), so
//! binary operators associate to the left.
//!
//! The algorithm does not know what it builds: a [`TreeBuilder`] turns recognized pieces
//! into the evaluator's [`Node`] tree or into the differentiator's prefix tree, so both
//! share one operator table and one set of precedence rules.
use crate::symbolic::errors::{ParseError, SyntaxError};
use crate::symbolic::eval_tree::Node;
use crate::symbolic::operators::{Op, ends_with_op, op_at};
use crate::symbolic::utils::{
    find_pair_to_this_bracket, is_all_numbers, is_variable, is_wrapped_in_brackets,
    normalize_literal,
};
use bigdecimal::BigDecimal;
use std::str::FromStr;

/// default nesting bound used by the free [`parse`] function
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Receives the pieces recognized by [`ExprParser`] and assembles them.
pub trait TreeBuilder {
    type Tree;
    fn constant(&mut self, literal: &str) -> Result<Self::Tree, SyntaxError>;
    fn variable(&mut self, name: &str) -> Self::Tree;
    fn unary(&mut self, op: Op, arg: Self::Tree) -> Self::Tree;
    fn binary(&mut self, op: Op, lhs: Self::Tree, rhs: Self::Tree) -> Self::Tree;
    /// left operand of a leading sign, as in `-x` == `0-x`
    fn zero(&mut self) -> Self::Tree;
}

/// builds the evaluator tree
pub struct NodeBuilder;

impl TreeBuilder for NodeBuilder {
    type Tree = Node;

    fn constant(&mut self, literal: &str) -> Result<Node, SyntaxError> {
        BigDecimal::from_str(&normalize_literal(literal))
            .map(Node::Constant)
            .map_err(|_| SyntaxError::InvalidNumber(literal.to_string()))
    }

    fn variable(&mut self, name: &str) -> Node {
        Node::Variable(name.to_string())
    }

    fn unary(&mut self, op: Op, arg: Node) -> Node {
        Node::Expression {
            op,
            left: Box::new(arg),
            right: None,
        }
    }

    fn binary(&mut self, op: Op, lhs: Node, rhs: Node) -> Node {
        Node::Expression {
            op,
            left: Box::new(lhs),
            right: Some(Box::new(rhs)),
        }
    }

    fn zero(&mut self) -> Node {
        Node::Constant(BigDecimal::from(0))
    }
}

pub struct ExprParser<'b, B: TreeBuilder> {
    builder: &'b mut B,
    max_depth: usize,
}

impl<'b, B: TreeBuilder> ExprParser<'b, B> {
    pub fn new(builder: &'b mut B, max_depth: usize) -> Self {
        Self { builder, max_depth }
    }

    /// parses preprocessed, validated text
    pub fn parse(&mut self, text: &str) -> Result<B::Tree, ParseError> {
        if text.is_empty() {
            return Err(SyntaxError::EmptyExpression);
        }
        let chars: Vec<char> = text.chars().collect();
        self.parse_at_depth(&chars, 0).map(|(tree, _)| tree)
    }

    /// `depth` counts nested sub-expressions; the returned height is that of the built tree.
    /// Both are bounded by `max_depth`, so a long flat chain such as `1+1+...+1` fails here
    /// instead of producing a tree too deep to walk.
    fn parse_at_depth(&mut self, exp: &[char], depth: usize) -> Result<(B::Tree, usize), ParseError> {
        if depth > self.max_depth {
            return Err(SyntaxError::RecursionLimitExceeded(self.max_depth));
        }
        if exp.is_empty() {
            return Err(SyntaxError::ArityMismatch(String::new()));
        }
        if is_wrapped_in_brackets(exp) {
            return self.parse_at_depth(&exp[1..exp.len() - 1], depth + 1);
        }
        if is_variable(exp) {
            let name: String = exp.iter().collect();
            return Ok((self.builder.variable(&name), 1));
        }
        if is_all_numbers(exp) {
            let literal: String = exp.iter().collect();
            return Ok((self.builder.constant(&literal)?, 1));
        }

        let mut tree: Option<(B::Tree, usize)> = None;
        let mut i = 0;
        while i < exp.len() {
            match op_at(exp, i) {
                None => {
                    // an operand without a leading operator is only legal at the start
                    if tree.is_some() {
                        return Err(missing_operator(exp));
                    }
                    let first = argument(None, exp, i);
                    let op_index = i + first.len();
                    let Some(op) = op_at(exp, op_index) else {
                        return Err(missing_operator(exp));
                    };
                    if !op.is_binary() {
                        return Err(missing_operator(exp));
                    }
                    let second = argument(Some(op), exp, op_index + op.symbol().len());
                    if second.is_empty() {
                        return Err(SyntaxError::ArityMismatch(op.to_string()));
                    }
                    let lhs = self.parse_at_depth(&first, depth + 1)?;
                    let rhs = self.parse_at_depth(&second, depth + 1)?;
                    tree = Some(self.binary(op, lhs, rhs)?);
                    i = op_index + op.symbol().len() + second.len();
                }
                Some(op) => {
                    let start = i + op.symbol().len();
                    let arg = argument(Some(op), exp, start);
                    if arg.is_empty() {
                        return Err(SyntaxError::ArityMismatch(op.to_string()));
                    }
                    let parsed = self.parse_at_depth(&arg, depth + 1)?;
                    tree = Some(if op.is_binary() {
                        let lhs = match tree.take() {
                            Some(lhs) => lhs,
                            None if matches!(op, Op::Add | Op::Sub) => (self.builder.zero(), 1),
                            None => return Err(SyntaxError::ArityMismatch(op.to_string())),
                        };
                        self.binary(op, lhs, parsed)?
                    } else {
                        if tree.is_some() {
                            return Err(missing_operator(exp));
                        }
                        let (arg, height) = parsed;
                        (self.builder.unary(op, arg), self.checked_height(height + 1)?)
                    });
                    i = start + arg.len();
                }
            }
        }
        tree.ok_or_else(|| missing_operator(exp))
    }

    fn binary(
        &mut self,
        op: Op,
        (lhs, lhs_height): (B::Tree, usize),
        (rhs, rhs_height): (B::Tree, usize),
    ) -> Result<(B::Tree, usize), ParseError> {
        let height = self.checked_height(lhs_height.max(rhs_height) + 1)?;
        Ok((self.builder.binary(op, lhs, rhs), height))
    }

    fn checked_height(&self, height: usize) -> Result<usize, ParseError> {
        if height > self.max_depth {
            return Err(SyntaxError::RecursionLimitExceeded(self.max_depth));
        }
        Ok(height)
    }
}

fn missing_operator(exp: &[char]) -> SyntaxError {
    SyntaxError::MissingOperator(exp.iter().collect())
}

/// Collects the argument of `operator` starting at `index`. Bracketed groups are taken
/// whole; the argument ends at an operator that binds no tighter than `operator`, unless
/// the text collected so far ends with a binary operator (a sign then belongs to the
/// operand). With no operator every operator ends the argument.
fn argument(operator: Option<Op>, exp: &[char], index: usize) -> Vec<char> {
    let precedence = operator.map_or(-1, |op| op.precedence());
    let mut collected: Vec<char> = Vec::new();
    let mut i = index;
    while i < exp.len() {
        if exp[i] == '(' {
            if let Some(close) = find_pair_to_this_bracket(exp, i) {
                collected.extend_from_slice(&exp[i..=close]);
                i = close + 1;
                continue;
            }
        }
        if let Some(op) = op_at(exp, i) {
            let after_binary = ends_with_op(&collected).is_some_and(|prev| prev.is_binary());
            if !collected.is_empty() && !after_binary && op.precedence() >= precedence {
                return collected;
            }
            let len = op.symbol().len();
            collected.extend_from_slice(&exp[i..i + len]);
            i += len;
            continue;
        }
        collected.push(exp[i]);
        i += 1;
    }
    collected
}

/// parses preprocessed, validated text into an evaluator tree
pub fn parse(text: &str) -> Result<Node, ParseError> {
    parse_with_depth(text, DEFAULT_MAX_DEPTH)
}

pub fn parse_with_depth(text: &str, max_depth: usize) -> Result<Node, ParseError> {
    let mut builder = NodeBuilder;
    ExprParser::new(&mut builder, max_depth).parse(text)
}
