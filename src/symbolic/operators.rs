//! # Operator table
//!
//! Closed enumeration of every operator and function the engine knows about, together with
//! its arity, precedence (lower binds tighter) and whether it works on angles.
//! Symbols are found in raw text by longest match, so `<=` wins over `<` and `acosh`
//! wins over `acos`.
use std::collections::HashMap;
use std::sync::LazyLock;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// length of the longest operator symbol (`deg2grad`, `rad2grad`, `grad2deg`, `grad2rad`)
pub const MAX_OPERATOR_LENGTH: usize = 8;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, AsRefStr, IntoStaticStr,
)]
pub enum Op {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "%")]
    Rem,
    #[strum(serialize = "^")]
    Pow,
    #[strum(serialize = "log")]
    Log,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = ">=")]
    Ge,
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    Ne,
    #[strum(serialize = "&&")]
    And,
    #[strum(serialize = "||")]
    Or,
    #[strum(serialize = "!")]
    Not,
    #[strum(serialize = "sin")]
    Sin,
    #[strum(serialize = "cos")]
    Cos,
    #[strum(serialize = "tan")]
    Tan,
    #[strum(serialize = "cotan")]
    Cotan,
    #[strum(serialize = "sec")]
    Sec,
    #[strum(serialize = "csc")]
    Csc,
    #[strum(serialize = "exsec")]
    Exsec,
    #[strum(serialize = "vers")]
    Vers,
    #[strum(serialize = "covers")]
    Covers,
    #[strum(serialize = "hav")]
    Hav,
    #[strum(serialize = "sinc")]
    Sinc,
    #[strum(serialize = "asin")]
    Asin,
    #[strum(serialize = "acos")]
    Acos,
    #[strum(serialize = "atan")]
    Atan,
    #[strum(serialize = "acotan")]
    Acotan,
    #[strum(serialize = "asec")]
    Asec,
    #[strum(serialize = "acsc")]
    Acsc,
    #[strum(serialize = "aexsec")]
    Aexsec,
    #[strum(serialize = "avers")]
    Avers,
    #[strum(serialize = "acovers")]
    Acovers,
    #[strum(serialize = "ahav")]
    Ahav,
    #[strum(serialize = "sinh")]
    Sinh,
    #[strum(serialize = "cosh")]
    Cosh,
    #[strum(serialize = "tanh")]
    Tanh,
    #[strum(serialize = "coth")]
    Coth,
    #[strum(serialize = "sech")]
    Sech,
    #[strum(serialize = "csch")]
    Csch,
    #[strum(serialize = "asinh")]
    Asinh,
    #[strum(serialize = "acosh")]
    Acosh,
    #[strum(serialize = "atanh")]
    Atanh,
    #[strum(serialize = "acoth")]
    Acoth,
    #[strum(serialize = "asech")]
    Asech,
    #[strum(serialize = "acsch")]
    Acsch,
    #[strum(serialize = "exp")]
    Exp,
    #[strum(serialize = "ln")]
    Ln,
    #[strum(serialize = "sqrt")]
    Sqrt,
    #[strum(serialize = "abs")]
    Abs,
    #[strum(serialize = "fpart")]
    Fpart,
    #[strum(serialize = "round")]
    Round,
    #[strum(serialize = "ceil")]
    Ceil,
    #[strum(serialize = "floor")]
    Floor,
    #[strum(serialize = "fac")]
    Fac,
    #[strum(serialize = "sfac")]
    Sfac,
    #[strum(serialize = "deg2rad")]
    Deg2rad,
    #[strum(serialize = "deg2grad")]
    Deg2grad,
    #[strum(serialize = "rad2deg")]
    Rad2deg,
    #[strum(serialize = "rad2grad")]
    Rad2grad,
    #[strum(serialize = "grad2deg")]
    Grad2deg,
    #[strum(serialize = "grad2rad")]
    Grad2rad,
}

/// immutable description of one operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorDescriptor {
    pub op: Op,
    pub symbol: &'static str,
    pub arity: usize,
    pub precedence: i32,
    pub trigonometric: bool,
}

static SYMBOL_TABLE: LazyLock<HashMap<&'static str, Op>> =
    LazyLock::new(|| Op::iter().map(|op| (op.into(), op)).collect());

impl Op {
    pub fn symbol(self) -> &'static str {
        self.into()
    }

    pub fn arity(self) -> usize {
        use Op::*;
        match self {
            Add | Sub | Mul | Div | Rem | Pow | Log | Lt | Gt | Le | Ge | Eq | Ne | And | Or => 2,
            _ => 1,
        }
    }

    pub fn is_binary(self) -> bool {
        self.arity() == 2
    }

    pub fn precedence(self) -> i32 {
        use Op::*;
        match self {
            Not => 1,
            Pow => 3,
            Mul | Div | Rem => 4,
            Log => 5,
            Add | Sub => 6,
            Lt | Gt | Le | Ge => 7,
            Eq | Ne => 8,
            Or => 9,
            And => 10,
            _ => 2,
        }
    }

    /// functions taking an angle as argument
    pub fn takes_angle(self) -> bool {
        use Op::*;
        matches!(
            self,
            Sin | Cos | Tan | Cotan | Sec | Csc | Exsec | Vers | Covers | Hav | Sinc
        )
    }

    /// inverse functions returning an angle
    pub fn returns_angle(self) -> bool {
        use Op::*;
        matches!(
            self,
            Asin | Acos | Atan | Acotan | Asec | Acsc | Aexsec | Avers | Acovers | Ahav
        )
    }

    pub fn is_trigonometric(self) -> bool {
        self.takes_angle() || self.returns_angle()
    }

    pub fn descriptor(self) -> OperatorDescriptor {
        OperatorDescriptor {
            op: self,
            symbol: self.symbol(),
            arity: self.arity(),
            precedence: self.precedence(),
            trigonometric: self.is_trigonometric(),
        }
    }
}

/// exact lookup of a symbol
pub fn lookup(symbol: &str) -> Option<OperatorDescriptor> {
    SYMBOL_TABLE.get(symbol).map(|op| op.descriptor())
}

/// Longest-match lookup of an operator starting at `index`.
/// Out-of-range indices simply find nothing.
pub fn op_at(text: &[char], index: usize) -> Option<Op> {
    if index >= text.len() {
        return None;
    }
    let longest = MAX_OPERATOR_LENGTH.min(text.len() - index);
    (1..=longest).rev().find_map(|len| {
        let candidate: String = text[index..index + len].iter().collect();
        SYMBOL_TABLE.get(candidate.as_str()).copied()
    })
}

/// Operator the text ends with, if any. The earliest start wins, so `xsinh` ends with
/// `sinh`, not `h`.
pub fn ends_with_op(text: &[char]) -> Option<Op> {
    let len = text.len();
    let start = len.saturating_sub(MAX_OPERATOR_LENGTH);
    (start..len).find_map(|i| op_at(text, i).filter(|op| i + op.symbol().chars().count() == len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_table_consistency() {
        let longest = Op::iter().map(|op| op.symbol().len()).max().unwrap();
        assert_eq!(longest, MAX_OPERATOR_LENGTH);
        assert!(Op::iter().count() >= 40);
        for op in Op::iter() {
            assert_eq!(Op::from_str(op.symbol()).unwrap(), op);
            assert_eq!(op.to_string(), op.symbol());
            assert!(op.arity() == 1 || op.arity() == 2);
        }
    }

    #[test]
    fn test_lookup() {
        let d = lookup("^").unwrap();
        assert_eq!(d.arity, 2);
        assert_eq!(d.precedence, 3);
        assert!(!d.trigonometric);
        let d = lookup("acos").unwrap();
        assert_eq!(d.arity, 1);
        assert_eq!(d.precedence, 2);
        assert!(d.trigonometric);
        assert!(lookup("foo").is_none());
        assert!(lookup("cosh").map(|d| !d.trigonometric).unwrap());
    }

    #[test]
    fn test_longest_match() {
        assert_eq!(op_at(&chars("<=3"), 0), Some(Op::Le));
        assert_eq!(op_at(&chars("<3"), 0), Some(Op::Lt));
        assert_eq!(op_at(&chars("acosh(x)"), 0), Some(Op::Acosh));
        assert_eq!(op_at(&chars("acos(x)"), 0), Some(Op::Acos));
        assert_eq!(op_at(&chars("aexsec(x)"), 0), Some(Op::Aexsec));
        assert_eq!(op_at(&chars("x"), 0), None);
        assert_eq!(op_at(&chars("x"), 5), None);
        assert_eq!(op_at(&chars("2*x"), 1), Some(Op::Mul));
    }

    #[test]
    fn test_ends_with_op() {
        assert_eq!(ends_with_op(&chars("xsinh")), Some(Op::Sinh));
        assert_eq!(ends_with_op(&chars("2+")), Some(Op::Add));
        assert_eq!(ends_with_op(&chars("deg2rad")), Some(Op::Deg2rad));
        assert_eq!(ends_with_op(&chars("x")), None);
        assert_eq!(ends_with_op(&chars("")), None);
    }

    #[test]
    fn test_precedence_order() {
        assert!(Op::Pow.precedence() < Op::Mul.precedence());
        assert!(Op::Mul.precedence() < Op::Add.precedence());
        assert!(Op::Add.precedence() < Op::Lt.precedence());
        assert!(Op::Eq.precedence() < Op::Or.precedence());
        assert!(Op::Sin.precedence() < Op::Pow.precedence());
    }
}
