//! Text normalization applied before validation and parsing:
//! whitespace removal, lower-casing, scientific notation and implicit multiplication.
//! None of these passes fails; a lookahead running past the end of the text means
//! "no rewrite here".
use crate::symbolic::operators::{ends_with_op, op_at};
use log::trace;

/// whitespace removed, lower-cased. This is also the key of the tree cache.
pub fn normalize(expression: &str) -> String {
    expression
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// `2e-3` -> `2*10^-3`. Only applies when `e` follows a digit and precedes a digit or a
/// signed digit, so identifiers such as `exp` or `euler` are left alone.
pub fn rewrite_scientific(expression: &str) -> String {
    let chars: Vec<char> = expression.chars().collect();
    let mut out = String::with_capacity(chars.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        if c == 'e' && i > 0 && chars[i - 1].is_ascii_digit() && exponent_follows(&chars, i + 1) {
            out.push_str("*10^");
        } else {
            out.push(c);
        }
    }
    out
}

fn exponent_follows(chars: &[char], at: usize) -> bool {
    match chars.get(at) {
        Some(c) if c.is_ascii_digit() => true,
        Some('+') | Some('-') => chars.get(at + 1).is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// Inserts `*` at juxtaposition boundaries:
/// letter before a one-argument function name, digit before a letter or `(`,
/// `)` before a letter or `(`, and a letter before `(` unless the text so far ends with
/// an operator name. Operator names are skipped as a whole, and nothing is inserted in
/// front of a two-argument name such as `log`.
pub fn insert_implicit_multiplication(expression: &str) -> String {
    let chars: Vec<char> = expression.chars().collect();
    let mut out: Vec<char> = Vec::with_capacity(chars.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        if let Some(op) = op_at(&chars, i) {
            let len = op.symbol().len();
            if !op.is_binary() && i > 0 && (chars[i - 1].is_ascii_alphabetic() || juxtaposed(&chars, i)) {
                out.push('*');
            }
            out.extend_from_slice(&chars[i..i + len]);
            i += len;
            continue;
        }
        if i > 0 && juxtaposed(&chars, i) {
            out.push('*');
        }
        out.push(chars[i]);
        i += 1;
    }
    out.into_iter().collect()
}

/// whether a multiplication belongs between `chars[i - 1]` and `chars[i]`
fn juxtaposed(chars: &[char], i: usize) -> bool {
    let prev = chars[i - 1];
    let cur = chars[i];
    let starts_operand = cur.is_ascii_alphabetic() || cur == '(';
    if prev.is_ascii_digit() && starts_operand {
        return true;
    }
    if prev == ')' && starts_operand {
        return true;
    }
    cur == '(' && prev.is_ascii_alphabetic() && ends_with_op(&chars[..i]).is_none()
}

/// full pipeline: normalize, scientific notation, implicit multiplication
pub fn preprocess(expression: &str) -> String {
    let normalized = normalize(expression);
    let scientific = rewrite_scientific(&normalized);
    let result = insert_implicit_multiplication(&scientific);
    trace!("preprocessed \"{}\" into \"{}\"", expression, result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(" 2 * X\t+ Sin( Y )\n"), "2*x+sin(y)");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_scientific() {
        assert_eq!(rewrite_scientific("1e-3"), "1*10^-3");
        assert_eq!(rewrite_scientific("2.5e10"), "2.5*10^10");
        assert_eq!(rewrite_scientific("3e+2"), "3*10^+2");
        assert_eq!(rewrite_scientific("exp(2)"), "exp(2)");
        assert_eq!(rewrite_scientific("2euler"), "2euler");
        // lookahead past the end is not an error
        assert_eq!(rewrite_scientific("2e"), "2e");
        assert_eq!(rewrite_scientific("2e-"), "2e-");
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(insert_implicit_multiplication("2(3+x)"), "2*(3+x)");
        assert_eq!(insert_implicit_multiplication("2x"), "2*x");
        assert_eq!(insert_implicit_multiplication("(x+1)(x-1)"), "(x+1)*(x-1)");
        assert_eq!(insert_implicit_multiplication("(x+1)y"), "(x+1)*y");
        assert_eq!(insert_implicit_multiplication("xsin(x)"), "x*sin(x)");
        assert_eq!(insert_implicit_multiplication("x(y+1)"), "x*(y+1)");
        assert_eq!(insert_implicit_multiplication("2sin(x)"), "2*sin(x)");
        assert_eq!(insert_implicit_multiplication("sin(x)"), "sin(x)");
        assert_eq!(insert_implicit_multiplication("acosh(x)"), "acosh(x)");
        assert_eq!(insert_implicit_multiplication("deg2rad(90)"), "deg2rad(90)");
        assert_eq!(insert_implicit_multiplication("8log2"), "8log2");
        assert_eq!(insert_implicit_multiplication("x2"), "x2");
    }

    #[test]
    fn test_preprocess_is_idempotent() {
        for e in ["2(3+x)", "1E-3", "2 x sin(y)", "(a+b)(a-b)", "3x^2+2x+1", "8log2", "!x&&y"] {
            let once = preprocess(e);
            assert_eq!(preprocess(&once), once, "for {}", e);
        }
    }

    #[test]
    fn test_preprocess_pipeline() {
        assert_eq!(preprocess("2 X E"), "2*xe");
        assert_eq!(preprocess("1.5E3X"), "1.5*10^3*x");
    }
}
