//! # Engine
//!
//! The public face of the crate. An [`Engine`] owns an evaluator, with its tree cache and
//! named constants, and a differentiator. Both sit behind one mutex, so a shared `&Engine`
//! can serve several threads; each call holds the lock for its whole duration.
//!
//! ## Configuration
//! [`EngineConfig`] carries the precision settings, the angle unit, recursion and
//! simplification limits and default variable bindings. It can be read from a task
//! document:
//! ```text
//! engine
//! precision: 40
//! angle_unit: degrees
//! bindings
//! g: 9.81
//! ```
//!
//! ## Example
//! ```rust, ignore
//! let engine = Engine::new();
//! let value = engine.evaluate_with("2(3+x)", "x=1").unwrap();
//! let derivatives = engine.differentiate("cos(x-y)", "x;y").unwrap();
//! ```
use crate::Utils::task_parser::{SectionMap, Value, parse_bindings, parse_document_as};
use crate::symbolic::big_math::{AngleUnit, MathContext};
use crate::symbolic::errors::{ConfigError, EvalError, SyntaxError};
use crate::symbolic::eval_tree::Evaluator;
use crate::symbolic::parse_expr::DEFAULT_MAX_DEPTH;
use crate::symbolic::preprocess::normalize;
use crate::symbolic::symbolic_engine_derivatives::Differentiator;
use crate::symbolic::utils::is_variable;
use bigdecimal::BigDecimal;
use log::info;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// significant digits for division, powers and widened transcendental results
    pub precision: u64,
    pub sqrt_scale: i64,
    pub sqrt_iterations: usize,
    pub angle_unit: AngleUnit,
    /// deepest nesting the parser and the binding resolver accept
    pub max_depth: usize,
    /// cap on simplification passes per derivative
    pub simplify_passes: usize,
    pub default_variable: String,
    /// bindings applied to every evaluation, overridden by the caller's own
    pub bindings: HashMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let ctx = MathContext::default();
        EngineConfig {
            precision: ctx.precision,
            sqrt_scale: ctx.sqrt_scale,
            sqrt_iterations: ctx.sqrt_iterations,
            angle_unit: AngleUnit::Radians,
            max_depth: DEFAULT_MAX_DEPTH,
            simplify_passes: 64,
            default_variable: "x".to_string(),
            bindings: HashMap::new(),
        }
    }
}

fn invalid(key: &str, value: &Value) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string_value(),
    }
}

fn single_value<'a>(key: &str, values: &'a [Value]) -> Result<&'a Value, ConfigError> {
    match values {
        [value] => Ok(value),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: values.iter().map(Value::to_string_value).collect::<Vec<_>>().join(", "),
        }),
    }
}

fn positive(key: &str, value: &Value) -> Result<i64, ConfigError> {
    match value.as_integer() {
        Some(n) if n > 0 => Ok(n),
        _ => Err(invalid(key, value)),
    }
}

impl EngineConfig {
    pub fn math_context(&self) -> MathContext {
        MathContext {
            precision: self.precision,
            sqrt_scale: self.sqrt_scale,
            sqrt_iterations: self.sqrt_iterations,
        }
    }

    /// Reads the `engine` and `bindings` sections of a task document. Missing keys keep
    /// their defaults; unknown sections and keys are errors.
    pub fn from_document(text: &str) -> Result<Self, ConfigError> {
        let document = parse_document_as(text).map_err(ConfigError::Parse)?;
        let mut config = EngineConfig::default();
        for (title, section) in &document {
            match title.as_str() {
                "engine" => config.apply_engine_section(section)?,
                "bindings" => config.apply_bindings_section(section)?,
                other => return Err(ConfigError::UnknownSection(other.to_string())),
            }
        }
        info!(
            "engine configuration loaded: precision {}, angle unit {:?}, {} default bindings",
            config.precision,
            config.angle_unit,
            config.bindings.len()
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("reading engine configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_document(&text)
    }

    fn apply_engine_section(&mut self, section: &SectionMap) -> Result<(), ConfigError> {
        for (key, values) in section {
            let value = single_value(key, values)?;
            match key.as_str() {
                "precision" => self.precision = positive(key, value)? as u64,
                "sqrt_scale" => self.sqrt_scale = positive(key, value)?,
                "sqrt_iterations" => self.sqrt_iterations = positive(key, value)? as usize,
                "max_depth" => self.max_depth = positive(key, value)? as usize,
                "simplify_passes" => self.simplify_passes = positive(key, value)? as usize,
                "angle_unit" => {
                    self.angle_unit = AngleUnit::from_str(&value.to_string_value())
                        .map_err(|_| invalid(key, value))?;
                }
                "default_variable" => {
                    let name = normalize(&value.to_string_value());
                    let chars: Vec<char> = name.chars().collect();
                    if !is_variable(&chars) {
                        return Err(invalid(key, value));
                    }
                    self.default_variable = name;
                }
                other => return Err(ConfigError::UnknownKey(other.to_string())),
            }
        }
        Ok(())
    }

    fn apply_bindings_section(&mut self, section: &SectionMap) -> Result<(), ConfigError> {
        for (name, values) in section {
            let value = single_value(name, values)?;
            self.bindings.insert(normalize(name), value.to_string_value());
        }
        Ok(())
    }
}

//___________________________________ENGINE____________________________________

struct EngineState {
    evaluator: Evaluator,
    differentiator: Differentiator,
}

pub struct Engine {
    config: EngineConfig,
    state: Mutex<EngineState>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        info!(
            "creating engine: precision {}, angle unit {:?}, max depth {}",
            config.precision, config.angle_unit, config.max_depth
        );
        let evaluator = Evaluator::new(config.math_context(), config.angle_unit, config.max_depth);
        let differentiator = Differentiator::new(
            config.max_depth,
            config.simplify_passes,
            &config.default_variable,
        );
        Engine {
            config,
            state: Mutex::new(EngineState {
                evaluator,
                differentiator,
            }),
        }
    }

    /// a panic in another caller leaves the state consistent, so a poisoned lock is reused
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Value of `expression`. Binding names are case-insensitive; a bound text that is not
    /// a literal is itself evaluated.
    pub fn evaluate(
        &self,
        expression: &str,
        bindings: &HashMap<String, String>,
    ) -> Result<BigDecimal, EvalError> {
        let mut state = self.lock();
        if self.config.bindings.is_empty() {
            return state.evaluator.evaluate_text(expression, bindings);
        }
        let mut merged = self.config.bindings.clone();
        merged.extend(bindings.iter().map(|(name, value)| (normalize(name), value.clone())));
        state.evaluator.evaluate_text(expression, &merged)
    }

    /// [`Engine::evaluate`] with bindings written as `"x=pi;y=2.34"`
    pub fn evaluate_with(&self, expression: &str, bindings: &str) -> Result<BigDecimal, EvalError> {
        let table = parse_bindings(bindings)?;
        self.evaluate(expression, &table)
    }

    /// One simplified infix derivative per variable of the `;`-separated list, or per
    /// variable of the expression when the list is blank.
    pub fn differentiate(&self, expression: &str, variables: &str) -> Result<Vec<String>, SyntaxError> {
        info!("differentiating \"{}\" with respect to \"{}\"", expression, variables);
        let state = self.lock();
        state.differentiator.differentiate(expression, variables)
    }

    pub fn set_angle_unit(&self, unit: AngleUnit) {
        info!("angle unit set to {:?}", unit);
        self.lock().evaluator.set_angle_unit(unit);
    }

    pub fn angle_unit(&self) -> AngleUnit {
        self.lock().evaluator.angle_unit()
    }

    /// parser runs so far, cache hits excluded
    pub fn parse_count(&self) -> usize {
        self.lock().evaluator.parse_count()
    }

    pub fn cached_trees(&self) -> usize {
        self.lock().evaluator.cached_trees()
    }

    /// the configuration in effect, angle unit included
    pub fn config(&self) -> EngineConfig {
        let mut config = self.config.clone();
        config.angle_unit = self.angle_unit();
        config
    }
}
