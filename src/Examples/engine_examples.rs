// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]

use crate::symbolic::big_math::AngleUnit;
use crate::symbolic::engine::{Engine, EngineConfig};
use crate::symbolic::symbolic_engine::Expr;
use std::collections::HashMap;

/// number of demo scenarios in [`engine_examples`]
pub const NUMBER_OF_EXAMPLES: usize = 6;

pub fn engine_examples(example: usize) {
    match example {
        0 => {
            // EVALUATION
            let engine = Engine::new();
            for input in ["2+3*4", "1e-3", "2^10 % 7", "sqrt(2)", "fac(20)", "(2<3)&&(3<4)"] {
                match engine.evaluate(input, &HashMap::new()) {
                    Ok(value) => println!("{} = {}", input, value),
                    Err(e) => println!("{} -> error: {}", input, e),
                }
            }
        }
        1 => {
            // VARIABLES AND BINDINGS
            // a bound value may be another expression, it is evaluated in turn
            let engine = Engine::new();
            let input = "2(3+x) + y";
            let result = engine.evaluate_with(input, "x=1; y=x*pi");
            println!("{} with x=1, y=x*pi: {:?}", input, result);
            // the tree is cached, new bindings do not parse the text again
            let result = engine.evaluate_with(input, "x=2; y=0");
            println!("{} with x=2, y=0: {:?}", input, result);
            println!(
                "parser runs: {}, cached trees: {}",
                engine.parse_count(),
                engine.cached_trees()
            );
            // cycles are reported instead of looping forever
            let result = engine.evaluate_with("a", "a=b+1;b=a+1");
            println!("a with a=b+1, b=a+1: {:?}", result);
        }
        2 => {
            // ANGLE UNITS
            let engine = Engine::new();
            for unit in [AngleUnit::Radians, AngleUnit::Degrees, AngleUnit::Gradians] {
                engine.set_angle_unit(unit);
                let sin = engine.evaluate_with("sin(pi/6)", "");
                let asin = engine.evaluate_with("asin(0.5)", "");
                println!("{:?}: sin(pi/6) = {:?}, asin(0.5) = {:?}", unit, sin, asin);
            }
        }
        3 => {
            // DIFFERENTIATION
            let engine = Engine::new();
            let cases = [
                ("x^2", "x"),
                ("sin(x)", "x"),
                ("cos(x-y)", "x;y"),
                ("x*y+pi", ""),
                ("ln(x^2+1)", "x"),
                ("exp(2*x)*sin(x)", "x"),
                ("x^x", "x"),
            ];
            for (input, variables) in cases {
                match engine.differentiate(input, variables) {
                    Ok(derivatives) => println!("d/d[{}] {} = {:?}", variables, input, derivatives),
                    Err(e) => println!("d/d[{}] {} -> error: {}", variables, input, e),
                }
            }
        }
        4 => {
            // PREFIX TREES AND SIMPLIFICATION
            let input = "(x+3)+x*1+0";
            match Expr::parse_expression(input, 256) {
                Ok((tree, variables)) => {
                    println!("prefix form {}, variables {:?}", tree, variables);
                    let simplified = tree.simplify_fixpoint(64);
                    println!("simplified {} = {}", simplified, simplified.to_infix());
                    if let Ok(derivative) = simplified.diff("x") {
                        println!("raw derivative {}", derivative);
                    }
                }
                Err(e) => println!("{} -> error: {}", input, e),
            }
        }
        5 => {
            // CONFIGURATION DOCUMENT
            let document = "
            // evaluation settings
            engine
            precision: 50
            angle_unit: degrees
            bindings
            g: 9.81
            t: 2
            ";
            match EngineConfig::from_document(document) {
                Ok(config) => {
                    println!("{:?}", config);
                    let engine = Engine::with_config(config);
                    let fall = engine.evaluate_with("g*t^2/2", "");
                    println!("g*t^2/2 = {:?}", fall);
                    let third = engine.evaluate_with("1/3", "");
                    println!("1/3 with 50 digits = {:?}", third);
                }
                Err(e) => println!("bad configuration: {}", e),
            }
        }
        _ => println!("no example number {}", example),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_examples_run() {
        for example in 0..=NUMBER_OF_EXAMPLES {
            engine_examples(example);
        }
    }
}
