//___________________________________TESTS____________________________________
// end-to-end behaviour of the engine: preprocessing, caching, evaluation failures,
// prefix round trips and differentiation checked against numeric difference quotients

#[cfg(test)]
mod tests {
    use crate::symbolic::big_math::AngleUnit;
    use crate::symbolic::engine::Engine;
    use crate::symbolic::errors::{EvalError, SyntaxError};
    use crate::symbolic::preprocess::preprocess;
    use crate::symbolic::symbolic_engine::Expr;
    use approx::assert_relative_eq;
    use bigdecimal::BigDecimal;
    use num_traits::ToPrimitive;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn eval(engine: &Engine, expression: &str, bindings: &str) -> f64 {
        engine
            .evaluate_with(expression, bindings)
            .unwrap()
            .to_f64()
            .unwrap()
    }

    fn no_bindings() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_arithmetic_and_precedence() {
        let engine = Engine::new();
        assert_eq!(engine.evaluate("2+3*4", &no_bindings()).unwrap(), BigDecimal::from(14));
        assert_eq!(engine.evaluate("(2+3)*4", &no_bindings()).unwrap(), BigDecimal::from(20));
        assert_eq!(engine.evaluate("2^3^0", &no_bindings()).unwrap(), BigDecimal::from(1));
        assert_eq!(engine.evaluate("10-4-3", &no_bindings()).unwrap(), BigDecimal::from(3));
        assert_eq!(engine.evaluate("17%5", &no_bindings()).unwrap(), BigDecimal::from(2));
        assert_eq!(engine.evaluate("-3+5", &no_bindings()).unwrap(), BigDecimal::from(2));
        assert_eq!(
            engine.evaluate("1e-3", &no_bindings()).unwrap(),
            BigDecimal::from_str("0.001").unwrap()
        );
        assert_eq!(
            engine.evaluate("2.5E2", &no_bindings()).unwrap(),
            BigDecimal::from(250)
        );
    }

    #[test]
    fn test_implicit_multiplication() {
        let engine = Engine::new();
        assert_eq!(engine.evaluate_with("2(3+x)", "x=1").unwrap(), BigDecimal::from(8));
        assert_eq!(engine.evaluate_with("(x+1)(x-1)", "x=3").unwrap(), BigDecimal::from(8));
        assert_eq!(engine.evaluate_with("3x", "x=2").unwrap(), BigDecimal::from(6));
        assert_relative_eq!(eval(&engine, "2pi", ""), 2.0 * std::f64::consts::PI, epsilon = 1e-12);
    }

    #[test]
    fn test_preprocessing_does_not_change_values() {
        let engine = Engine::new();
        for expression in [
            "2 (3 + X)",
            "1E-3 * x",
            "2sin(x) + 3cos(x)",
            "(x+1)(x-1)",
            "SQRT( 16 )x",
        ] {
            let raw = eval(&engine, expression, "x=0.7");
            let processed = eval(&engine, &preprocess(expression), "x=0.7");
            assert_relative_eq!(raw, processed, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_logic_and_comparisons() {
        let engine = Engine::new();
        assert_eq!(eval(&engine, "3>2", ""), 1.0);
        assert_eq!(eval(&engine, "3<=2", ""), 0.0);
        assert_eq!(eval(&engine, "2==2", ""), 1.0);
        assert_eq!(eval(&engine, "2!=2", ""), 0.0);
        assert_eq!(eval(&engine, "(1<2)&&(2<3)", ""), 1.0);
        assert_eq!(eval(&engine, "(1>2)||(2>3)", ""), 0.0);
        assert_eq!(eval(&engine, "!(1>2)", ""), 1.0);
        assert_eq!(eval(&engine, "true&&false", ""), 0.0);
    }

    #[test]
    fn test_functions() {
        let engine = Engine::new();
        assert_relative_eq!(eval(&engine, "sqrt(2)", ""), 2f64.sqrt(), epsilon = 1e-14);
        assert_relative_eq!(eval(&engine, "ln(euler)", ""), 1.0, epsilon = 1e-14);
        assert_relative_eq!(eval(&engine, "8 log 2", ""), 3.0, epsilon = 1e-12);
        assert_relative_eq!(eval(&engine, "sinh(1)", ""), 1f64.sinh(), epsilon = 1e-14);
        assert_relative_eq!(eval(&engine, "atanh(0.5)", ""), 0.5f64.atanh(), epsilon = 1e-14);
        assert_eq!(eval(&engine, "fac(5)", ""), 120.0);
        assert_eq!(eval(&engine, "abs(-2.5)", ""), 2.5);
        assert_eq!(eval(&engine, "floor(-2.5)", ""), -3.0);
        assert_eq!(eval(&engine, "ceil(2.1)", ""), 3.0);
        assert_relative_eq!(eval(&engine, "rad2deg(pi)", ""), 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_evaluation_failures() {
        let engine = Engine::new();
        assert_eq!(engine.evaluate("1/0", &no_bindings()), Err(EvalError::DivisionByZero));
        assert!(matches!(
            engine.evaluate("asin(2)", &no_bindings()),
            Err(EvalError::DomainError { ref op, .. }) if op == "asin"
        ));
        assert!(matches!(
            engine.evaluate("(2+3", &no_bindings()),
            Err(EvalError::Syntax(SyntaxError::UnbalancedParentheses(_)))
        ));
        assert!(matches!(
            engine.evaluate("", &no_bindings()),
            Err(EvalError::Syntax(SyntaxError::EmptyExpression))
        ));
        assert!(matches!(
            engine.evaluate("2**3", &no_bindings()),
            Err(EvalError::Syntax(SyntaxError::IllegalAdjacentOperators(_)))
        ));
        assert!(matches!(
            engine.evaluate("2$3", &no_bindings()),
            Err(EvalError::Syntax(SyntaxError::IllegalCharacter { ch: '$', .. }))
        ));
        assert_eq!(
            engine.evaluate("x+1", &no_bindings()),
            Err(EvalError::UnboundVariable("x".to_string()))
        );
        assert!(matches!(
            engine.evaluate("fac(-1)", &no_bindings()),
            Err(EvalError::InvalidArgument { .. })
        ));
        assert!(matches!(
            engine.evaluate_with("a", "a=b+1;b=a+1"),
            Err(EvalError::CyclicBinding(_))
        ));
    }

    #[test]
    fn test_nesting_limit_is_not_a_syntax_error() {
        let engine = Engine::new();
        let deep = format!("{}x{}", "(".repeat(300), ")".repeat(300));
        let err = engine.evaluate_with(&deep, "x=1").unwrap_err();
        assert!(err.is_recursion_limit());
        let shallow = format!("{}x{}", "(".repeat(20), ")".repeat(20));
        assert_eq!(eval(&engine, &shallow, "x=1"), 1.0);
    }

    #[test]
    fn test_bindings_resolve_recursively() {
        let engine = Engine::new();
        assert_eq!(eval(&engine, "z", "x=2;y=x*3;z=y+x"), 8.0);
        let bindings = HashMap::from([("X".to_string(), "4".to_string())]);
        assert_eq!(engine.evaluate("sqrt(x)", &bindings).unwrap(), BigDecimal::from(2));
        // named constants win over bindings
        assert_relative_eq!(eval(&engine, "pi", "pi=3"), std::f64::consts::PI, epsilon = 1e-12);
    }

    #[test]
    fn test_tree_cache() {
        let engine = Engine::new();
        assert_eq!(eval(&engine, "x^2+y", "x=1;y=2"), 3.0);
        assert_eq!(eval(&engine, "x^2+y", "x=3;y=4"), 13.0);
        assert_eq!(eval(&engine, " X^2 + Y ", "x=0;y=0"), 0.0);
        assert_eq!(engine.parse_count(), 1);
        assert_eq!(engine.cached_trees(), 1);
        eval(&engine, "x^3", "x=1");
        assert_eq!(engine.parse_count(), 2);
        assert_eq!(engine.cached_trees(), 2);
    }

    #[test]
    fn test_angle_units_apply_to_trigonometry() {
        let engine = Engine::new();
        engine.set_angle_unit(AngleUnit::Degrees);
        assert_relative_eq!(eval(&engine, "cos(60)", ""), 0.5, epsilon = 1e-12);
        assert_relative_eq!(eval(&engine, "atan(1)", ""), 45.0, epsilon = 1e-9);
        engine.set_angle_unit(AngleUnit::Gradians);
        assert_relative_eq!(eval(&engine, "sin(100)", ""), 1.0, epsilon = 1e-12);
        engine.set_angle_unit(AngleUnit::Radians);
        assert_relative_eq!(eval(&engine, "sin(pi/2)", ""), 1.0, epsilon = 1e-12);
        // hyperbolic functions ignore the unit
        engine.set_angle_unit(AngleUnit::Degrees);
        assert_relative_eq!(eval(&engine, "tanh(1)", ""), 1f64.tanh(), epsilon = 1e-14);
    }

    #[test]
    fn test_prefix_round_trip_preserves_value() {
        let engine = Engine::new();
        let bindings = "x=0.7;y=1.9";
        for expression in [
            "x^2+3*x-5",
            "sin(x-y)*cos(x)",
            "(x+y)/(x-y)",
            "x-(y-x)",
            "x/(y*x)",
            "(x+1)^(y+2)",
            "ln(x)*exp(y)",
            "x-y-x*y",
            "-x+y",
            "2^(x*y)/3",
        ] {
            let (tree, _) = Expr::parse_expression(expression, 256).unwrap();
            let infix = tree.to_infix();
            let original = eval(&engine, expression, bindings);
            let reprinted = eval(&engine, &infix, bindings);
            assert_relative_eq!(original, reprinted, epsilon = 1e-12, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_differentiation_examples() {
        let engine = Engine::new();
        assert_eq!(engine.differentiate("x^2", "x").unwrap(), vec!["2*x"]);
        assert_eq!(engine.differentiate("sin(x)", "x").unwrap(), vec!["cos(x)"]);
        assert_eq!(
            engine.differentiate("cos(x-y)", "x;y").unwrap(),
            vec!["-1*sin(x-y)", "sin(x-y)"]
        );
        assert_eq!(engine.differentiate("x*y+pi", "").unwrap(), vec!["y", "x"]);
        assert!(matches!(
            engine.differentiate("x^2", "x;;y"),
            Err(SyntaxError::InvalidVariable(_))
        ));
        assert!(matches!(
            engine.differentiate("round(x)", "x"),
            Err(SyntaxError::NotDifferentiable(_))
        ));
    }

    /// analytic derivative against a central difference quotient at `at`
    fn assert_derivative(engine: &Engine, expression: &str, at: f64) {
        let h = 1e-6;
        let derivative = engine.differentiate(expression, "x").unwrap();
        let analytic = eval(engine, &derivative[0], &format!("x={}", at));
        let ahead = eval(engine, expression, &format!("x={}", at + h));
        let behind = eval(engine, expression, &format!("x={}", at - h));
        let numeric = (ahead - behind) / (2.0 * h);
        assert!(
            (analytic - numeric).abs() <= 1e-5 * (1.0 + numeric.abs()),
            "d/dx {} at {}: {} = {} but the quotient gives {}",
            expression,
            at,
            derivative[0],
            analytic,
            numeric
        );
    }

    #[test]
    fn test_derivatives_match_difference_quotients() {
        let engine = Engine::new();
        for expression in [
            "x^3-2x+1",
            "sin(x)*cos(x)",
            "exp(2x)/(x+1)",
            "ln(x^2+1)",
            "sqrt(x+1)",
            "x^x",
            "tan(x)",
            "atan(x)",
            "asin(x)",
            "acos(x)",
            "sinh(x)*cosh(x)",
            "sec(x)",
            "hav(x)",
            "(x+1) log 2",
        ] {
            assert_derivative(&engine, expression, 0.6);
        }
    }

    #[test]
    fn test_trigonometric_family_derivatives() {
        let engine = Engine::new();
        for expression in [
            "cotan(x)",
            "csc(x)",
            "sec(x)",
            "exsec(x)",
            "vers(x)",
            "covers(x)",
            "hav(x)",
            "sinc(x)",
            "cotan(2x)",
            "csc(x^2)",
            "hav(3x)*vers(x)",
        ] {
            for at in [0.6, -0.6, 1.3] {
                assert_derivative(&engine, expression, at);
            }
        }
    }

    #[test]
    fn test_inverse_function_derivatives() {
        let engine = Engine::new();
        for expression in [
            "asin(x)",
            "acos(x)",
            "atan(x)",
            "acotan(x)",
            "asinh(x)",
            "atanh(x)",
            "acsch(x)",
            "asin(x/2)",
            "atan(x^2)",
        ] {
            for at in [0.6, -0.6] {
                assert_derivative(&engine, expression, at);
            }
        }
        // domains of the versine family and asech
        for expression in ["avers(x)", "acovers(x)", "ahav(x)", "asech(x)"] {
            for at in [0.3, 0.6] {
                assert_derivative(&engine, expression, at);
            }
        }
        for expression in ["acosh(x)", "acoth(x)"] {
            assert_derivative(&engine, expression, 1.7);
        }
        assert_derivative(&engine, "acoth(x)", -1.7);
    }

    #[test]
    fn test_hyperbolic_derivatives() {
        let engine = Engine::new();
        for expression in ["sinh(x)", "cosh(x)", "tanh(x)", "coth(x)", "sech(x)", "csch(x)"] {
            for at in [0.6, -0.6, 1.3] {
                assert_derivative(&engine, expression, at);
            }
        }
    }

    #[test]
    fn test_abs_and_angle_conversion_derivatives() {
        let engine = Engine::new();
        for expression in ["abs(x)", "abs(x^3-x)", "x*abs(x)"] {
            for at in [0.6, -0.6, -1.3] {
                assert_derivative(&engine, expression, at);
            }
        }
        for expression in [
            "deg2rad(x)",
            "deg2grad(x)",
            "rad2deg(x)",
            "rad2grad(x)",
            "grad2deg(x)",
            "grad2rad(x)",
            "sin(deg2rad(x^2))",
        ] {
            assert_derivative(&engine, expression, -0.6);
        }
    }

    #[test]
    fn test_roots_of_even_powers_at_negative_points() {
        let engine = Engine::new();
        for expression in ["sqrt(x^2)", "(x^2)^0.5", "sqrt(x^6)", "(x^4)^0.25"] {
            for at in [-1.0, -0.6, 0.6] {
                assert_derivative(&engine, expression, at);
            }
        }
        let derivative = engine.differentiate("sqrt(x^2)", "x").unwrap();
        assert_eq!(eval(&engine, &derivative[0], "x=-1"), -1.0);
    }

    #[test]
    fn test_long_flat_expressions() {
        let engine = Engine::new();
        let err = engine.evaluate_with(&vec!["1"; 200_000].join("+"), "").unwrap_err();
        assert!(err.is_recursion_limit());
        let err = engine.evaluate_with(&vec!["x"; 1000].join("*"), "x=1").unwrap_err();
        assert!(err.is_recursion_limit());
        assert!(engine.differentiate(&vec!["x"; 1000].join("+"), "x").is_err());
        assert_eq!(eval(&engine, &vec!["1"; 200].join("+"), ""), 200.0);
        assert_eq!(
            engine.differentiate(&vec!["x"; 100].join("+"), "x").unwrap(),
            vec!["100"]
        );
    }
}
