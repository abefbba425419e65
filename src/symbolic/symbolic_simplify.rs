//! # Symbolic Expression Simplification Module
//!
//! Smart constructors for prefix trees. Every `make_*` function receives already built
//! arguments and returns an equivalent, usually smaller, tree. Simplifying a whole tree
//! means rebuilding it bottom-up through the constructors, repeated until a pass changes
//! nothing ([`Expr::simplify_fixpoint`]).
//!
//! ## Simplification Strategy
//!
//! 1. **Constant Folding**: `2+3` => `5`; quotients and powers fold only when the result
//!    is an integer, so `1/3` stays exact
//! 2. **Algebraic Identities**: `x+0`, `x*1`, `x^1`, `x/1`, `0*x`, `x-x`, `x/x`
//! 3. **Like Terms**: `(x+3)+x` => `2*x+3`, `3*x-x` => `2*x`, `(p+q)-(p+r)` => `q-r`
//! 4. **Distribution**: a constant or variable factor is multiplied into sums and
//!    differences, `x^n*x` => `x^(n+1)`, `(a+b)*(a-b)` => `a^2-b^2`
//! 5. **Quotients**: nested quotients are flattened, `(a+b)/a` => `1+b/a`
//! 6. **Powers and roots**: `(x^c)^d` => `x^(c*d)` for integer `d`, `sqrt(16)` => `4`,
//!    `sqrt(x^4)` => `x^2`, `sqrt(x^2)` => `abs(x)`
//! 7. **Inverse functions**: `sin(asin(u))` => `u`, `ln(exp(u))` => `u`, `exp(0)` => `1` ...
//!
//! Every rewrite keeps the value of the expression on the domain where both sides are
//! defined.
use crate::symbolic::operators::Op;
use crate::symbolic::symbolic_engine::Expr;
use log::warn;

fn c(value: f64) -> Expr {
    Expr::Const(value)
}

fn list(op: Op, a: Expr, b: Expr) -> Expr {
    Expr::BinOp(op, a.boxed(), b.boxed())
}

fn is_integer(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0
}

/// arguments of `e` when its root is the binary operator `op`
fn parts(e: &Expr, op: Op) -> Option<(&Expr, &Expr)> {
    match e {
        Expr::BinOp(o, l, r) if *o == op => Some((l, r)),
        _ => None,
    }
}

/// `e + t`, written as a difference when `t` is negative
fn shifted(e: &Expr, t: f64) -> Expr {
    if t >= 0.0 {
        Expr::make_sum(c(t), e.clone())
    } else {
        Expr::make_subtraction(e.clone(), c(-t))
    }
}

impl Expr {
    //___________________________________SUM____________________________________

    pub fn make_sum(a: Expr, b: Expr) -> Expr {
        if let (Some(x), Some(y)) = (a.constant(), b.constant()) {
            return c(x + y);
        }
        if a.is_const_value(0.0) {
            return b;
        }
        if b.is_const_value(0.0) {
            return a;
        }
        if a == b {
            return Expr::make_product(c(2.0), a);
        }
        if a.is_compound() {
            return match b {
                Expr::Const(k) => sum_with_constant(a, k),
                Expr::Var(_) => sum_with_variable(a, b),
                _ => sum_of_two_expressions(a, b),
            };
        }
        if b.is_compound() {
            return match a {
                Expr::Const(k) => sum_with_constant(b, k),
                _ => sum_with_variable(b, a),
            };
        }
        list(Op::Add, a, b)
    }

    //___________________________________PRODUCT____________________________________

    pub fn make_product(a: Expr, b: Expr) -> Expr {
        if let (Some(x), Some(y)) = (a.constant(), b.constant()) {
            return c(x * y);
        }
        if a.is_const_value(0.0) || b.is_const_value(0.0) {
            return c(0.0);
        }
        if a.is_const_value(1.0) {
            return b;
        }
        if b.is_const_value(1.0) {
            return a;
        }
        if a == b {
            return Expr::make_power(a, c(2.0));
        }
        if a.is_compound() && b.is_compound() {
            return product_of_two_expressions(a, b);
        }
        if a.is_compound() {
            return match b {
                Expr::Const(k) => product_with_constant(a, k),
                _ => product_with_variable(a, b),
            };
        }
        if b.is_compound() {
            return match a {
                Expr::Const(k) => product_with_constant(b, k),
                _ => product_with_variable(b, a),
            };
        }
        list(Op::Mul, a, b)
    }

    //___________________________________DIVISION____________________________________

    pub fn make_division(a: Expr, b: Expr) -> Expr {
        if let (Some(x), Some(y)) = (a.constant(), b.constant()) {
            if y != 0.0 && is_integer(x / y) {
                return c(x / y);
            }
            return list(Op::Div, a, b);
        }
        if a.is_const_value(0.0) {
            return c(0.0);
        }
        if b.is_const_value(1.0) {
            return a;
        }
        if a == b {
            return c(1.0);
        }
        if matches!(a.op(), Some(Op::Add | Op::Sub | Op::Mul)) {
            return division_split(a, b);
        }
        if let Some((p, q)) = parts(&a, Op::Div) {
            if !b.is_compound() {
                return Expr::make_division(p.clone(), Expr::make_product(b, q.clone()));
            }
            if let Some((r, s)) = parts(&b, Op::Div) {
                return Expr::make_division(
                    Expr::make_product(p.clone(), s.clone()),
                    Expr::make_product(q.clone(), r.clone()),
                );
            }
        }
        list(Op::Div, a, b)
    }

    //___________________________________SUBTRACTION____________________________________

    pub fn make_subtraction(a: Expr, b: Expr) -> Expr {
        if let (Some(x), Some(y)) = (a.constant(), b.constant()) {
            return c(x - y);
        }
        if a.is_const_value(0.0) {
            return Expr::make_product(c(-1.0), b);
        }
        if b.is_const_value(0.0) {
            return a;
        }
        if a == b {
            return c(0.0);
        }
        match (a.is_compound(), b.is_compound()) {
            (false, true) => subtraction_from_leaf(a, b),
            (true, false) => subtraction_of_leaf(a, b),
            (true, true) => subtraction_of_two_expressions(a, b),
            (false, false) => list(Op::Sub, a, b),
        }
    }

    //___________________________________POWERS AND ROOTS____________________________________

    pub fn make_power(a: Expr, b: Expr) -> Expr {
        if let (Some(x), Some(y)) = (a.constant(), b.constant()) {
            if x == 1.0 || y == 0.0 {
                return c(1.0);
            }
            if y == 1.0 {
                return a;
            }
            let power = x.powf(y);
            if is_integer(power) {
                return c(power);
            }
            return list(Op::Pow, a, b);
        }
        if b.is_const_value(0.0) {
            return c(1.0);
        }
        if b.is_const_value(1.0) {
            return a;
        }
        // (u^a)^b == u^(a*b) for integer b, or for odd a when a*b is an integer;
        // otherwise the sign of u is lost, as in (x^2)^0.5
        if let (Some((base, inner)), Some(outer)) = (parts(&a, Op::Pow), b.constant()) {
            if let Some(inner) = inner.constant() {
                let odd = is_integer(inner) && inner % 2.0 != 0.0;
                if is_integer(outer) || (odd && is_integer(inner * outer)) {
                    return Expr::make_power(base.clone(), c(inner * outer));
                }
            }
        }
        list(Op::Pow, a, b)
    }

    pub fn make_sqrt(a: Expr) -> Expr {
        if let Some(x) = a.constant() {
            let root = x.sqrt();
            if is_integer(root) {
                return c(root);
            }
        }
        // sqrt(u^(2k)) == |u^k|, the bars dropped for even k
        if let Some((base, exponent)) = parts(&a, Op::Pow) {
            if let Some(n) = exponent.constant() {
                let k = n / 2.0;
                if is_integer(k) {
                    let root = Expr::make_power(base.clone(), c(k));
                    if k % 2.0 == 0.0 {
                        return root;
                    }
                    return Expr::make_func(Op::Abs, root);
                }
            }
        }
        Expr::func(Op::Sqrt, a)
    }

    //___________________________________FUNCTIONS____________________________________

    /// Applies a unary function, collapsing compositions with its inverse.
    pub fn make_func(op: Op, a: Expr) -> Expr {
        let inner = a.op();
        let arg = a.arg1().cloned();
        let one_minus_square = |e: Expr| {
            Expr::make_sqrt(Expr::make_subtraction(c(1.0), Expr::make_power(e, c(2.0))))
        };
        match (op, inner, arg) {
            (Op::Sqrt, _, _) => Expr::make_sqrt(a),
            (Op::Sin, Some(Op::Asin), Some(e))
            | (Op::Cos, Some(Op::Acos), Some(e))
            | (Op::Tan, Some(Op::Atan), Some(e))
            | (Op::Cotan, Some(Op::Acotan), Some(e))
            | (Op::Acotan, Some(Op::Cotan), Some(e))
            | (Op::Ln, Some(Op::Exp), Some(e))
            | (Op::Exp, Some(Op::Ln), Some(e))
            | (Op::Sinh, Some(Op::Asinh), Some(e))
            | (Op::Cosh, Some(Op::Acosh), Some(e))
            | (Op::Tanh, Some(Op::Atanh), Some(e)) => e,
            (Op::Sin, Some(Op::Acos), Some(e)) | (Op::Cos, Some(Op::Asin), Some(e)) => {
                one_minus_square(e)
            }
            (Op::Tan, Some(Op::Acotan), Some(e)) => Expr::make_division(c(1.0), e),
            (Op::Exp, _, _) if a.is_const_value(0.0) => c(1.0),
            _ => Expr::func(op, a),
        }
    }

    /// Applies a binary operator through its constructor.
    pub fn make_binary(op: Op, a: Expr, b: Expr) -> Expr {
        match op {
            Op::Add => Expr::make_sum(a, b),
            Op::Sub => Expr::make_subtraction(a, b),
            Op::Mul => Expr::make_product(a, b),
            Op::Div => Expr::make_division(a, b),
            Op::Pow => Expr::make_power(a, b),
            _ => list(op, a, b),
        }
    }

    //___________________________________WHOLE TREES____________________________________

    /// One bottom-up pass of the tree through the constructors.
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Const(_) | Expr::Var(_) => self.clone(),
            Expr::Func(op, a) => Expr::make_func(*op, a.simplify()),
            Expr::BinOp(op, a, b) => Expr::make_binary(*op, a.simplify(), b.simplify()),
        }
    }

    /// Repeats [`Expr::simplify`] until a pass changes nothing, at most `max_passes` times.
    pub fn simplify_fixpoint(&self, max_passes: usize) -> Expr {
        let mut now = self.clone();
        for _ in 0..max_passes {
            let next = now.simplify();
            if next == now {
                return now;
            }
            now = next;
        }
        warn!(
            "simplification of {} stopped after {} passes without a fixed point",
            self, max_passes
        );
        now
    }
}

// ( + 5 ( + 3 x ) ) => ( + 8 x )
fn sum_with_constant(a: Expr, k: f64) -> Expr {
    if let Some((p, q)) = parts(&a, Op::Add) {
        if let Some(x) = p.constant() {
            return shifted(q, x + k);
        }
        if let Some(x) = q.constant() {
            return shifted(p, x + k);
        }
    } else if let Some((p, q)) = parts(&a, Op::Sub) {
        if let Some(x) = p.constant() {
            return Expr::make_subtraction(c(x + k), q.clone());
        }
        if let Some(x) = q.constant() {
            return shifted(p, k - x);
        }
    }
    list(Op::Add, a, c(k))
}

// ( + x ( + 3 x ) ) => ( + ( * 2 x ) 3 )
fn sum_with_variable(a: Expr, v: Expr) -> Expr {
    if let Some((p, q)) = parts(&a, Op::Add) {
        if *p == v {
            return Expr::make_sum(Expr::make_product(c(2.0), v), q.clone());
        }
        if *q == v {
            return Expr::make_sum(Expr::make_product(c(2.0), v), p.clone());
        }
    } else if let Some((p, q)) = parts(&a, Op::Sub) {
        if *p == v {
            return Expr::make_subtraction(Expr::make_product(c(2.0), v), q.clone());
        }
        if *q == v {
            return p.clone();
        }
    } else if let Some((p, q)) = parts(&a, Op::Mul) {
        if let (Some(k), true) = (p.constant(), *q == v) {
            return Expr::make_product(c(1.0 + k), v);
        }
        if let (Some(k), true) = (q.constant(), *p == v) {
            return Expr::make_product(c(1.0 + k), v);
        }
    }
    list(Op::Add, a, v)
}

fn sum_of_two_expressions(a: Expr, b: Expr) -> Expr {
    let two = |e: &Expr| Expr::make_product(c(2.0), e.clone());
    let sum = |x: &Expr, y: &Expr| Expr::make_sum(x.clone(), y.clone());
    let sub = |x: &Expr, y: &Expr| Expr::make_subtraction(x.clone(), y.clone());
    // (1 + k) * e
    let grown = |k: f64, e: &Expr| Expr::make_product(c(1.0 + k), e.clone());

    if let (Some((p, q)), Some((r, s))) = (parts(&a, Op::Add), parts(&b, Op::Add)) {
        if p == r {
            return Expr::make_sum(two(p), sum(q, s));
        } else if q == s {
            return Expr::make_sum(two(q), sum(p, r));
        } else if p == s {
            return Expr::make_sum(two(p), sum(q, r));
        } else if q == r {
            return Expr::make_sum(two(q), sum(p, s));
        }
    } else if let (Some((p, q)), Some((r, s))) = (parts(&a, Op::Add), parts(&b, Op::Sub)) {
        if p == r {
            return Expr::make_sum(two(p), sub(q, s));
        } else if p == s {
            return sum(q, r);
        } else if q == r {
            return Expr::make_sum(two(q), sub(p, s));
        } else if q == s {
            return sum(p, r);
        }
    } else if let (Some((p, q)), Some((r, s))) = (parts(&a, Op::Add), parts(&b, Op::Mul)) {
        if let Some(k) = r.constant() {
            if p == s {
                return Expr::make_sum(q.clone(), grown(k, p));
            } else if q == s {
                return Expr::make_sum(p.clone(), grown(k, q));
            }
        } else if let Some(k) = s.constant() {
            if p == r {
                return Expr::make_sum(q.clone(), grown(k, p));
            } else if q == r {
                return Expr::make_sum(p.clone(), grown(k, q));
            }
        }
    } else if a.is_op(Op::Sub) && b.is_op(Op::Add) {
        return sum_of_two_expressions(b, a);
    } else if let (Some((p, q)), Some((r, s))) = (parts(&a, Op::Sub), parts(&b, Op::Sub)) {
        if p == r {
            return Expr::make_subtraction(two(p), sum(q, s));
        } else if p == s {
            return sub(r, q);
        } else if q == r {
            return sub(p, s);
        } else if q == s {
            return Expr::make_subtraction(sum(p, r), two(q));
        }
    } else if let (Some((p, q)), Some((r, s))) = (parts(&a, Op::Sub), parts(&b, Op::Mul)) {
        if let Some(k) = r.constant() {
            if p == s {
                return Expr::make_subtraction(grown(k, p), q.clone());
            } else if q == s {
                return Expr::make_sum(Expr::make_product(c(k - 1.0), q.clone()), p.clone());
            }
        } else if let Some(k) = s.constant() {
            if p == r {
                return Expr::make_subtraction(grown(k, p), q.clone());
            } else if q == r {
                return Expr::make_sum(Expr::make_product(c(k - 1.0), q.clone()), p.clone());
            }
        }
    }
    list(Op::Add, a, b)
}

// ( * ( + 3 x ) x ) => ( + ( * x 3 ) ( ^ x 2 ) )
fn product_with_variable(a: Expr, v: Expr) -> Expr {
    if let Some((p, q)) = parts(&a, Op::Add) {
        return Expr::make_sum(
            Expr::make_product(v.clone(), p.clone()),
            Expr::make_product(v, q.clone()),
        );
    }
    if let Some((p, q)) = parts(&a, Op::Sub) {
        return Expr::make_subtraction(
            Expr::make_product(v.clone(), p.clone()),
            Expr::make_product(v, q.clone()),
        );
    }
    if let Some((base, exponent)) = parts(&a, Op::Pow) {
        if *base == v {
            return Expr::make_power(v, Expr::make_sum(c(1.0), exponent.clone()));
        }
    }
    list(Op::Mul, v, a)
}

// ( * ( + 3 x ) ( - 3 x ) ) => ( - 9 ( ^ x 2 ) )
fn product_of_two_expressions(a: Expr, b: Expr) -> Expr {
    let square = |e: &Expr| Expr::make_power(e.clone(), c(2.0));
    let (sum, difference) = if a.is_op(Op::Add) { (&a, &b) } else { (&b, &a) };
    if let (Some((p, q)), Some((r, s))) = (parts(sum, Op::Add), parts(difference, Op::Sub)) {
        if p == r && q == s {
            return Expr::make_subtraction(square(p), square(q));
        }
        if p == s && q == r {
            return Expr::make_subtraction(square(q), square(p));
        }
    }
    list(Op::Mul, a, b)
}

// ( * ( + 3 x ) 5 ) => ( + 15 ( * 5 x ) )
fn product_with_constant(a: Expr, k: f64) -> Expr {
    if let Some((p, q)) = parts(&a, Op::Add) {
        return if k < 0.0 {
            Expr::make_subtraction(
                Expr::make_product(c(k), p.clone()),
                Expr::make_product(c(-k), q.clone()),
            )
        } else {
            Expr::make_sum(Expr::make_product(c(k), p.clone()), Expr::make_product(c(k), q.clone()))
        };
    }
    if let Some((p, q)) = parts(&a, Op::Sub) {
        return if k < 0.0 {
            Expr::make_sum(
                Expr::make_product(c(k), p.clone()),
                Expr::make_product(c(-k), q.clone()),
            )
        } else {
            Expr::make_subtraction(
                Expr::make_product(c(k), p.clone()),
                Expr::make_product(c(k), q.clone()),
            )
        };
    }
    if let Some((p, q)) = parts(&a, Op::Mul) {
        if let Some(x) = p.constant() {
            return Expr::make_product(c(k * x), q.clone());
        }
        if let Some(x) = q.constant() {
            return Expr::make_product(c(k * x), p.clone());
        }
    }
    list(Op::Mul, c(k), a)
}

// ( / ( + 3 x ) x ) => ( + ( / 3 x ) 1 )
fn division_split(a: Expr, b: Expr) -> Expr {
    let over = |e: &Expr| Expr::make_division(e.clone(), b.clone());
    if let Some(op) = a.op() {
        if let (Some(p), Some(q)) = (a.arg1(), a.arg2()) {
            if *p == b {
                match op {
                    Op::Add => return Expr::make_sum(c(1.0), over(q)),
                    Op::Sub => return Expr::make_subtraction(c(1.0), over(q)),
                    Op::Mul => return q.clone(),
                    _ => {}
                }
            } else if *q == b {
                match op {
                    Op::Add => return Expr::make_sum(over(p), c(1.0)),
                    Op::Sub => return Expr::make_subtraction(over(p), c(1.0)),
                    Op::Mul => return p.clone(),
                    _ => {}
                }
            }
        }
    }
    list(Op::Div, a, b)
}

// ( - ( + 5 x ) 2 ) => ( + 3 x )
fn subtraction_of_leaf(a: Expr, b: Expr) -> Expr {
    if let Some(k) = b.constant() {
        if let Some((p, q)) = parts(&a, Op::Add) {
            if let Some(x) = p.constant() {
                return Expr::make_sum(c(x - k), q.clone());
            }
            if let Some(x) = q.constant() {
                return Expr::make_sum(c(x - k), p.clone());
            }
        } else if let Some((p, q)) = parts(&a, Op::Sub) {
            if let Some(x) = p.constant() {
                return Expr::make_subtraction(c(x - k), q.clone());
            }
            if let Some(x) = q.constant() {
                return Expr::make_subtraction(p.clone(), c(x + k));
            }
        }
    } else if b.is_variable() {
        if let Some((p, q)) = parts(&a, Op::Add) {
            if *p == b {
                return q.clone();
            }
            if *q == b {
                return p.clone();
            }
        } else if let Some((p, q)) = parts(&a, Op::Sub) {
            if *p == b {
                return Expr::make_product(c(-1.0), q.clone());
            }
            if *q == b {
                return Expr::make_subtraction(p.clone(), Expr::make_product(c(2.0), b));
            }
        } else if let Some((p, q)) = parts(&a, Op::Mul) {
            if let (Some(x), true) = (p.constant(), *q == b) {
                return Expr::make_product(c(x - 1.0), b);
            }
            if let (Some(x), true) = (q.constant(), *p == b) {
                return Expr::make_product(c(x - 1.0), b);
            }
        }
    }
    list(Op::Sub, a, b)
}

// ( - 5 ( + 2 x ) ) => ( - 3 x )
fn subtraction_from_leaf(a: Expr, b: Expr) -> Expr {
    if let Some(k) = a.constant() {
        if let Some((p, q)) = parts(&b, Op::Add) {
            if let Some(x) = p.constant() {
                return Expr::make_subtraction(c(k - x), q.clone());
            }
            if let Some(x) = q.constant() {
                return Expr::make_subtraction(c(k - x), p.clone());
            }
        } else if let Some((p, q)) = parts(&b, Op::Sub) {
            if let Some(x) = p.constant() {
                return Expr::make_sum(c(k - x), q.clone());
            }
            if let Some(x) = q.constant() {
                return Expr::make_subtraction(c(k + x), p.clone());
            }
        }
    } else if a.is_variable() {
        if let Some((p, q)) = parts(&b, Op::Add) {
            if *p == a {
                return Expr::make_product(c(-1.0), q.clone());
            }
            if *q == a {
                return Expr::make_product(c(-1.0), p.clone());
            }
        } else if let Some((p, q)) = parts(&b, Op::Sub) {
            if *p == a {
                return q.clone();
            }
            if *q == a {
                return Expr::make_subtraction(Expr::make_product(c(2.0), a), p.clone());
            }
        } else if let Some((p, q)) = parts(&b, Op::Mul) {
            if let (Some(x), true) = (p.constant(), *q == a) {
                return Expr::make_product(c(1.0 - x), a);
            }
            if let (Some(x), true) = (q.constant(), *p == a) {
                return Expr::make_product(c(1.0 - x), a);
            }
        }
    }
    list(Op::Sub, a, b)
}

// ( - ( + 5 x ) ( + 2 x ) ) => 3
fn subtraction_of_two_expressions(a: Expr, b: Expr) -> Expr {
    let two = |e: &Expr| Expr::make_product(c(2.0), e.clone());
    let sum = |x: &Expr, y: &Expr| Expr::make_sum(x.clone(), y.clone());
    let sub = |x: &Expr, y: &Expr| Expr::make_subtraction(x.clone(), y.clone());
    let neg = |e: &Expr| Expr::make_product(c(-1.0), e.clone());
    // (1 - k) * e
    let shrunk = |k: f64, e: &Expr| Expr::make_product(c(1.0 - k), e.clone());
    // (1 + k) * e
    let grown = |k: f64, e: &Expr| Expr::make_product(c(1.0 + k), e.clone());

    if let (Some((p, q)), Some((r, s))) = (parts(&a, Op::Add), parts(&b, Op::Add)) {
        if p == r {
            return sub(q, s);
        } else if p == s {
            return sub(q, r);
        } else if q == r {
            return sub(p, s);
        } else if q == s {
            return sub(p, r);
        }
    } else if let (Some((p, q)), Some((r, s))) = (parts(&a, Op::Add), parts(&b, Op::Sub)) {
        if p == r {
            return sum(q, s);
        } else if p == s {
            return Expr::make_sum(two(p), sub(q, r));
        } else if q == r {
            return sum(p, s);
        } else if q == s {
            return Expr::make_sum(two(q), sub(p, r));
        }
    } else if let (Some((p, q)), Some((r, s))) = (parts(&a, Op::Add), parts(&b, Op::Mul)) {
        if let Some(k) = r.constant() {
            if p == s {
                return Expr::make_sum(shrunk(k, p), q.clone());
            } else if q == s {
                return Expr::make_sum(shrunk(k, q), p.clone());
            }
        } else if let Some(k) = s.constant() {
            if p == r {
                return Expr::make_sum(shrunk(k, p), q.clone());
            } else if q == r {
                return Expr::make_sum(shrunk(k, q), p.clone());
            }
        }
    } else if let (Some((p, q)), Some((r, s))) = (parts(&a, Op::Sub), parts(&b, Op::Add)) {
        if p == r {
            return Expr::make_subtraction(neg(q), s.clone());
        } else if p == s {
            return Expr::make_subtraction(neg(q), r.clone());
        } else if q == r {
            return Expr::make_subtraction(sub(p, s), two(r));
        } else if q == s {
            return Expr::make_subtraction(sub(p, r), two(q));
        }
    } else if let (Some((p, q)), Some((r, s))) = (parts(&a, Op::Sub), parts(&b, Op::Sub)) {
        if p == r {
            return sub(s, q);
        } else if p == s {
            return Expr::make_subtraction(two(p), sum(q, r));
        } else if q == r {
            return Expr::make_subtraction(sum(p, s), two(r));
        } else if q == s {
            return sub(p, r);
        }
    } else if let (Some((p, q)), Some((r, s))) = (parts(&a, Op::Sub), parts(&b, Op::Mul)) {
        if let Some(k) = r.constant() {
            if p == s {
                return Expr::make_subtraction(shrunk(k, p), q.clone());
            } else if q == s {
                return Expr::make_subtraction(p.clone(), grown(k, q));
            }
        } else if let Some(k) = s.constant() {
            if p == r {
                return Expr::make_subtraction(shrunk(k, p), q.clone());
            } else if q == r {
                return Expr::make_subtraction(p.clone(), grown(k, q));
            }
        }
    }
    list(Op::Sub, a, b)
}
