//! # Arbitrary-precision math library
//!
//! Numeric primitives over `BigDecimal` for every operator of the table.
//!
//! - `+ - * %`, rounding functions, factorials and angle conversions are computed in
//!   decimal arithmetic;
//! - division and integer powers are exact up to `MathContext::precision` significant digits;
//! - square root uses Newton's method (see [`sqrt`]);
//! - transcendental functions are evaluated in `f64` and widened to decimal through the
//!   shortest round-tripping representation, so `sin(x)` carries 15-17 correct digits.
//!
//! Every function validates its domain and reports `MathError` instead of producing NaN
//! or infinity.
use crate::symbolic::errors::MathError;
use bigdecimal::BigDecimal;
use bigdecimal::num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::str::FromStr;
use std::sync::LazyLock;
use strum_macros::{Display, EnumIter, EnumString};

const PI_DIGITS: &str = "3.14159265358979323846264338327950288419716939937510";
const EULER_DIGITS: &str = "2.71828182845904523536028747135266249775724709369995";
/// largest argument accepted by `fac`/`sfac`
pub const MAX_FACTORIAL: u64 = 10_000;
/// integer exponents up to this magnitude are computed by repeated squaring
const MAX_EXACT_EXPONENT: i64 = 4096;

pub static PI: LazyLock<BigDecimal> =
    LazyLock::new(|| BigDecimal::from_str(PI_DIGITS).expect("PI_DIGITS is a valid decimal"));
pub static EULER: LazyLock<BigDecimal> =
    LazyLock::new(|| BigDecimal::from_str(EULER_DIGITS).expect("EULER_DIGITS is a valid decimal"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum AngleUnit {
    #[strum(serialize = "degrees", serialize = "deg")]
    Degrees,
    #[default]
    #[strum(serialize = "radians", serialize = "rad")]
    Radians,
    #[strum(serialize = "gradians", serialize = "grad")]
    Gradians,
}

/// precision settings shared by all primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathContext {
    /// significant digits kept after division, powers and widening
    pub precision: u64,
    /// significant digits carried by the Newton iteration for square roots
    pub sqrt_scale: i64,
    pub sqrt_iterations: usize,
}

impl Default for MathContext {
    fn default() -> Self {
        MathContext {
            precision: 32,
            sqrt_scale: 50,
            sqrt_iterations: 50,
        }
    }
}

fn domain(op: &str, value: &BigDecimal) -> MathError {
    MathError::DomainError {
        op: op.to_string(),
        value: value.clone(),
    }
}

fn invalid(op: &str, value: &BigDecimal) -> MathError {
    MathError::InvalidArgument {
        op: op.to_string(),
        value: value.clone(),
    }
}

/// `lo <= a <= hi`, bounds given as integers
fn check_range(op: &str, a: &BigDecimal, lo: i64, hi: i64) -> Result<(), MathError> {
    if *a < BigDecimal::from(lo) || *a > BigDecimal::from(hi) {
        return Err(domain(op, a));
    }
    Ok(())
}

/// Rounds to `digits` significant digits when longer, dropping trailing zeros.
/// Shorter values are returned untouched.
pub fn round_to(a: BigDecimal, digits: u64) -> BigDecimal {
    if a.digits() > digits {
        a.with_prec(digits).normalized()
    } else {
        a
    }
}

pub fn is_integral(a: &BigDecimal) -> bool {
    a.with_scale(0) == *a
}

/// `f64` view of a decimal; values outside the `f64` range become infinite or NaN and are
/// rejected later by [`widen`]
pub fn narrow(a: &BigDecimal) -> f64 {
    a.to_f64().unwrap_or(f64::NAN)
}

/// Decimal view of a native result. Non-finite values are a domain error of `op` at `arg`.
pub fn widen(op: &str, value: f64, arg: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    if !value.is_finite() {
        return Err(domain(op, arg));
    }
    BigDecimal::from_str(&format!("{:e}", value))
        .map(|d| round_to(d, ctx.precision))
        .map_err(|_| domain(op, arg))
}

fn native(op: &str, a: &BigDecimal, ctx: &MathContext, f: impl Fn(f64) -> f64) -> Result<BigDecimal, MathError> {
    widen(op, f(narrow(a)), a, ctx)
}

/// `1 / f(a)` where `f(a) == 0` is a division by zero
fn native_reciprocal(op: &str, a: &BigDecimal, ctx: &MathContext, f: impl Fn(f64) -> f64) -> Result<BigDecimal, MathError> {
    let denominator = f(narrow(a));
    if denominator == 0.0 {
        return Err(MathError::DivisionByZero);
    }
    widen(op, 1.0 / denominator, a, ctx)
}

//___________________________________ARITHMETIC____________________________________

pub fn divide(a: &BigDecimal, b: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    Ok(round_to(a / b, ctx.precision))
}

/// remainder with the sign of the dividend
pub fn remainder(a: &BigDecimal, b: &BigDecimal) -> Result<BigDecimal, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    Ok(a % b)
}

fn pow_int(base: &BigDecimal, exponent: u64, ctx: &MathContext) -> BigDecimal {
    let work = ctx.precision + 16;
    let mut result = BigDecimal::one();
    let mut square = base.clone();
    let mut n = exponent;
    while n > 0 {
        if n & 1 == 1 {
            result = round_to(&result * &square, work);
        }
        n >>= 1;
        if n > 0 {
            square = round_to(&square * &square, work);
        }
    }
    result
}

/// `a ^ b`; integral exponents are computed in decimal so `10^-3 == 0.001` exactly
pub fn pow(a: &BigDecimal, b: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    if is_integral(b) && b.abs() <= BigDecimal::from(MAX_EXACT_EXPONENT) {
        let n = b.to_i64().ok_or_else(|| domain("^", a))?;
        if n >= 0 {
            return Ok(round_to(pow_int(a, n as u64, ctx), ctx.precision));
        }
        if a.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        return divide(&BigDecimal::one(), &pow_int(a, n.unsigned_abs(), ctx), ctx);
    }
    if a.is_zero() && b.is_negative() {
        return Err(MathError::DivisionByZero);
    }
    widen("^", narrow(a).powf(narrow(b)), a, ctx)
}

/// binary logarithm operator: `a log b == ln a / ln b`
pub fn log(a: &BigDecimal, b: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    if !a.is_positive() {
        return Err(domain("log", a));
    }
    if !b.is_positive() {
        return Err(domain("log", b));
    }
    let base = narrow(b).ln();
    if base == 0.0 {
        return Err(MathError::DivisionByZero);
    }
    widen("log", narrow(a).ln() / base, a, ctx)
}

/// Square root by Newton's method.
///
/// The seed is `10^k` with `k = floor(log10 a) / 2`, so it lies within a factor of
/// ten of the root whatever the magnitude of `a`. Each step is rounded to
/// `sqrt_scale` significant digits (at least `precision + 2`); iteration stops when two
/// successive guesses agree to that many digits, or after `sqrt_iterations` steps. The
/// result is rounded to `precision` significant digits.
pub fn sqrt(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    if a.is_negative() {
        return Err(domain("sqrt", a));
    }
    if a.is_zero() {
        return Ok(BigDecimal::zero());
    }
    let mut guess = BigDecimal::new(BigInt::one(), -decimal_exponent(a).div_euclid(2));
    let work = (ctx.sqrt_scale.max(0) as u64).max(ctx.precision + 2);
    let two = BigDecimal::from(2);
    let tolerance = BigDecimal::new(BigInt::one(), work as i64);
    for _ in 0..ctx.sqrt_iterations {
        let next = round_to((a / &guess + &guess) / &two, work);
        let converged = next == guess || (&next - &guess).abs() <= &next * &tolerance;
        guess = next;
        if converged {
            break;
        }
    }
    Ok(round_to(guess, ctx.precision))
}

/// `floor(log10 |a|)` of a nonzero decimal
fn decimal_exponent(a: &BigDecimal) -> i64 {
    let (_, scale) = a.as_bigint_and_exponent();
    a.digits() as i64 - scale - 1
}

pub fn exp(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native("exp", a, ctx, f64::exp)
}

pub fn ln(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    if !a.is_positive() {
        return Err(domain("ln", a));
    }
    native("ln", a, ctx, f64::ln)
}

//___________________________________TRIGONOMETRY (radians)____________________________________

pub fn sin(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native("sin", a, ctx, f64::sin)
}

pub fn cos(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native("cos", a, ctx, f64::cos)
}

pub fn tan(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native("tan", a, ctx, f64::tan)
}

pub fn cotan(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native_reciprocal("cotan", a, ctx, f64::tan)
}

pub fn sec(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native_reciprocal("sec", a, ctx, f64::cos)
}

pub fn csc(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native_reciprocal("csc", a, ctx, f64::sin)
}

/// exsecant, `sec(a) - 1`
pub fn exsec(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    let c = narrow(a).cos();
    if c == 0.0 {
        return Err(MathError::DivisionByZero);
    }
    widen("exsec", 1.0 / c - 1.0, a, ctx)
}

/// versine, `1 - cos(a)`
pub fn vers(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native("vers", a, ctx, |x| 1.0 - x.cos())
}

/// coversine, `1 - sin(a)`
pub fn covers(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native("covers", a, ctx, |x| 1.0 - x.sin())
}

/// haversine, `(1 - cos(a)) / 2`
pub fn hav(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native("hav", a, ctx, |x| (1.0 - x.cos()) / 2.0)
}

/// unnormalized sinc, `sin(a) / a` with `sinc(0) = 1`
pub fn sinc(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    if a.is_zero() {
        return Ok(BigDecimal::one());
    }
    native("sinc", a, ctx, |x| x.sin() / x)
}

pub fn asin(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    check_range("asin", a, -1, 1)?;
    native("asin", a, ctx, f64::asin)
}

pub fn acos(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    check_range("acos", a, -1, 1)?;
    native("acos", a, ctx, f64::acos)
}

pub fn atan(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native("atan", a, ctx, f64::atan)
}

/// `atan(1/a)`, with `acotan(0) = pi/2`
pub fn acotan(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    if a.is_zero() {
        return divide(&PI, &BigDecimal::from(2), ctx);
    }
    native("acotan", a, ctx, |x| (1.0 / x).atan())
}

/// `acos(1/a)`
pub fn asec(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    check_range("asec", a, -1, 1)?;
    if a.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    native("asec", a, ctx, |x| (1.0 / x).acos())
}

/// `asin(1/a)`
pub fn acsc(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    check_range("acsc", a, -1, 1)?;
    if a.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    native("acsc", a, ctx, |x| (1.0 / x).asin())
}

/// inverse exsecant, `acos(1/(1+a))`
pub fn aexsec(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    check_range("aexsec", a, -2, 0)?;
    let shifted = a + BigDecimal::one();
    if shifted.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    native("aexsec", a, ctx, |x| (1.0 / (1.0 + x)).acos())
}

/// inverse versine, `acos(1 - a)`
pub fn avers(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    check_range("avers", a, 0, 2)?;
    native("avers", a, ctx, |x| (1.0 - x).acos())
}

/// inverse coversine, `asin(1 - a)`
pub fn acovers(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    check_range("acovers", a, 0, 2)?;
    native("acovers", a, ctx, |x| (1.0 - x).asin())
}

/// inverse haversine, `acos(1 - 2a)`
pub fn ahav(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    check_range("ahav", a, 0, 1)?;
    native("ahav", a, ctx, |x| (1.0 - 2.0 * x).acos())
}

//___________________________________HYPERBOLIC____________________________________

pub fn sinh(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native("sinh", a, ctx, f64::sinh)
}

pub fn cosh(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native("cosh", a, ctx, f64::cosh)
}

pub fn tanh(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native("tanh", a, ctx, f64::tanh)
}

pub fn coth(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native_reciprocal("coth", a, ctx, f64::tanh)
}

pub fn sech(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native_reciprocal("sech", a, ctx, f64::cosh)
}

pub fn csch(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native_reciprocal("csch", a, ctx, f64::sinh)
}

pub fn asinh(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    native("asinh", a, ctx, f64::asinh)
}

pub fn acosh(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    if *a < BigDecimal::one() {
        return Err(domain("acosh", a));
    }
    native("acosh", a, ctx, f64::acosh)
}

pub fn atanh(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    check_range("atanh", a, -1, 1)?;
    native("atanh", a, ctx, f64::atanh)
}

/// `atanh(1/a)`, defined for `|a| > 1`
pub fn acoth(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    if a.abs() < BigDecimal::one() {
        return Err(domain("acoth", a));
    }
    native("acoth", a, ctx, |x| (1.0 / x).atanh())
}

/// `acosh(1/a)`, defined on `(0, 1]`
pub fn asech(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    check_range("asech", a, 0, 1)?;
    if a.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    native("asech", a, ctx, |x| (1.0 / x).acosh())
}

/// `asinh(1/a)`
pub fn acsch(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    if a.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    native("acsch", a, ctx, |x| (1.0 / x).asinh())
}

//___________________________________ROUNDING____________________________________

/// integer part, rounded toward zero
pub fn trunc(a: &BigDecimal) -> BigDecimal {
    a.with_scale(0)
}

pub fn floor(a: &BigDecimal) -> BigDecimal {
    let t = trunc(a);
    if *a < t { t - BigDecimal::one() } else { t }
}

pub fn ceil(a: &BigDecimal) -> BigDecimal {
    let t = trunc(a);
    if *a > t { t + BigDecimal::one() } else { t }
}

/// half rounds up: `round(2.5) = 3`, `round(-2.5) = -2`
pub fn round(a: &BigDecimal) -> BigDecimal {
    floor(&(a + BigDecimal::new(BigInt::from(5), 1)))
}

/// fractional part, carrying the sign of `a`
pub fn fpart(a: &BigDecimal) -> BigDecimal {
    a - trunc(a)
}

//___________________________________FACTORIALS____________________________________

fn factorial_argument(op: &str, a: &BigDecimal) -> Result<u64, MathError> {
    if a.is_negative() || !is_integral(a) {
        return Err(invalid(op, a));
    }
    match a.to_u64() {
        Some(n) if n <= MAX_FACTORIAL => Ok(n),
        _ => Err(invalid(op, a)),
    }
}

/// `n!` as an exact integer
pub fn fac(a: &BigDecimal) -> Result<BigDecimal, MathError> {
    let n = factorial_argument("fac", a)?;
    let product = (2..=n).fold(BigInt::one(), |acc, k| acc * k);
    Ok(BigDecimal::new(product, 0))
}

/// double factorial `n!! = n (n-2) (n-4) ...`, exact
pub fn sfac(a: &BigDecimal) -> Result<BigDecimal, MathError> {
    let n = factorial_argument("sfac", a)?;
    let product = (1..=n)
        .rev()
        .step_by(2)
        .fold(BigInt::one(), |acc, k| acc * k);
    Ok(BigDecimal::new(product, 0))
}

//___________________________________ANGLES____________________________________

pub fn deg2rad(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    divide(&(a * &*PI), &BigDecimal::from(180), ctx)
}

pub fn deg2grad(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    divide(&(a * BigDecimal::from(200)), &BigDecimal::from(180), ctx)
}

pub fn rad2deg(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    divide(&(a * BigDecimal::from(180)), &PI, ctx)
}

pub fn rad2grad(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    divide(&(a * BigDecimal::from(200)), &PI, ctx)
}

pub fn grad2deg(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    divide(&(a * BigDecimal::from(180)), &BigDecimal::from(200), ctx)
}

pub fn grad2rad(a: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    divide(&(a * &*PI), &BigDecimal::from(200), ctx)
}

/// angle in `unit` expressed in radians
pub fn to_radians(a: &BigDecimal, unit: AngleUnit, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    match unit {
        AngleUnit::Radians => Ok(a.clone()),
        AngleUnit::Degrees => deg2rad(a, ctx),
        AngleUnit::Gradians => grad2rad(a, ctx),
    }
}

/// radian angle expressed in `unit`
pub fn from_radians(a: &BigDecimal, unit: AngleUnit, ctx: &MathContext) -> Result<BigDecimal, MathError> {
    match unit {
        AngleUnit::Radians => Ok(a.clone()),
        AngleUnit::Degrees => rad2deg(a, ctx),
        AngleUnit::Gradians => rad2grad(a, ctx),
    }
}
