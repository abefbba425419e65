//! Single left-to-right scan over preprocessed text that rejects what the parser must
//! never see: unbalanced brackets, doubled binary operators and foreign characters.
use crate::symbolic::errors::SyntaxError;
use crate::symbolic::operators::op_at;

/// punctuation that may appear outside operator symbols
pub fn is_allowed_symbol(c: char) -> bool {
    matches!(c, '(' | ')' | '.' | '>' | '<' | '&' | '=' | '|')
}

pub fn validate(text: &str) -> Result<(), SyntaxError> {
    if text.is_empty() {
        return Err(SyntaxError::EmptyExpression);
    }
    let open = text.chars().filter(|&c| c == '(').count();
    let close = text.chars().filter(|&c| c == ')').count();
    if open != close {
        return Err(SyntaxError::UnbalancedParentheses(text.to_string()));
    }
    let chars: Vec<char> = text.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        match op_at(&chars, i) {
            Some(op) => {
                let next = i + op.symbol().len();
                if let Some(following) = op_at(&chars, next) {
                    if following.is_binary() && !matches!(following.symbol(), "+" | "-") {
                        return Err(SyntaxError::IllegalAdjacentOperators(near(&chars, i)));
                    }
                }
            }
            None => {
                if !(c.is_ascii_alphabetic() || c.is_ascii_digit() || is_allowed_symbol(c)) {
                    return Err(SyntaxError::IllegalCharacter {
                        ch: c,
                        near: near(&chars, i),
                    });
                }
            }
        }
    }
    Ok(())
}

fn near(chars: &[char], i: usize) -> String {
    chars[i..].iter().collect()
}
