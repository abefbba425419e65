// the collection of utility functions for bracket matching and literal recognition,
// shared by the parser and the differentiator
use crate::symbolic::operators::op_at;
use crate::symbolic::syntax_check::is_allowed_symbol;

/// Index of the `)` closing the `(` at `bracket_start`, or `None` when it never closes.
pub fn find_pair_to_this_bracket(input: &[char], bracket_start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &c) in input.iter().enumerate().skip(bracket_start) {
        if c == '(' {
            depth += 1;
        } else if c == ')' {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// `(…)` around the whole text, e.g. `(x+1)` but not `(x)+(y)`
pub fn is_wrapped_in_brackets(input: &[char]) -> bool {
    input.first() == Some(&'(') && find_pair_to_this_bracket(input, 0) == Some(input.len() - 1)
}

pub fn has_brackets(s: &str) -> bool {
    s.contains('(') || s.contains(')')
}

/// optional sign, digits, at most one decimal point, at least one digit
pub fn is_all_numbers(input: &[char]) -> bool {
    let body = match input.first() {
        Some('+') | Some('-') => &input[1..],
        _ => input,
    };
    let mut dots = 0;
    let mut digits = 0;
    for &c in body {
        match c {
            '.' => dots += 1,
            c if c.is_ascii_digit() => digits += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

/// Text with no operator and no punctuation anywhere, that is not a number.
/// `x2` and `pi` qualify, `cost` does not since it contains `cos`.
pub fn is_variable(input: &[char]) -> bool {
    if input.is_empty() || is_all_numbers(input) {
        return false;
    }
    (0..input.len()).all(|i| op_at(input, i).is_none() && !is_allowed_symbol(input[i]))
}

/// Puts a literal into a form every number parser accepts: `2.` -> `2.0`, `-.5` -> `-0.5`.
pub fn normalize_literal(literal: &str) -> String {
    let (sign, body) = match literal.strip_prefix(['+', '-']) {
        Some(rest) => (&literal[..1], rest),
        None => ("", literal),
    };
    let mut out = String::from(if sign == "-" { "-" } else { "" });
    if body.starts_with('.') {
        out.push('0');
    }
    out.push_str(body);
    if body.ends_with('.') {
        out.push('0');
    }
    out
}
