//! examples of usage of RustedCalc
/// evaluation, bindings, angle units, differentiation and configuration examples
pub mod engine_examples;
