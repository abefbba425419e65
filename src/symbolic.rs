/// the closed table of operators: symbols, arity, precedence and the angle flags
pub mod operators;
/// text normalization: whitespace, case, scientific notation and implicit multiplication
pub mod preprocess;
/// single left-to-right scan rejecting what the parser must never see
pub mod syntax_check;
/// ________________________________________________________________________________________________________________________________
/// precedence parser working directly on characters, shared by the evaluator and the differentiator
///# Example
/// ```
/// use RustedCalc::symbolic::parse_expr::parse;
/// use RustedCalc::symbolic::preprocess::preprocess;
/// let tree = parse(&preprocess("2(3+x)")).unwrap();
/// println!("{}", tree);
/// ```
pub mod parse_expr;
/// BigDecimal numerics: exact arithmetic, Newton square roots, widened transcendental functions
pub mod big_math;
/// evaluator tree, tree cache and post-order reduction
pub mod eval_tree;
/// error taxonomy
pub mod errors;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// 1) turns a String expression into a prefix tree
/// 2) simplifies the tree
/// 3) differentiates it and prints the result back as infix text
///# Example
/// ```
/// use RustedCalc::symbolic::symbolic_engine::Expr;
/// let (tree, variables) = Expr::parse_expression("x^2*y", 256).unwrap();
/// println!("prefix form {}, variables {:?}", tree, variables);
/// let d_dx = tree.diff("x").unwrap().simplify_fixpoint(64);
/// println!("d/dx = {}", d_dx.to_infix());
/// ```
pub mod symbolic_engine;
pub mod symbolic_engine_derivatives;
pub mod symbolic_simplify;
///________________________________________________________________________________________________________________________________________________
///
/// public entry points and configuration
///# Example
/// ```
/// use RustedCalc::symbolic::engine::Engine;
/// let engine = Engine::new();
/// let value = engine.evaluate_with("2(3+x)", "x=1").unwrap();
/// assert_eq!(value, bigdecimal::BigDecimal::from(8));
/// let derivatives = engine.differentiate("cos(x-y)", "x;y").unwrap();
/// assert_eq!(derivatives, vec!["-1*sin(x-y)", "sin(x-y)"]);
/// ```
pub mod engine;
///______________________________________________________________________________________________________________________________________________
/// the collection of utility functions mainly for bracket parsing and proceeding
/// _____________________________________________________________________________________________________________________________________________
pub mod utils;

mod symbolic_engine_tests;
