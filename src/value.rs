use serde::Serialize;
use serde_json::value::{to_value, Value as Json};

/// Render a Json value into the textual form templates emit.
///
/// `Null` renders empty so that missing payload fields contribute nothing,
/// and whole-valued floats render without the trailing `.0` a helper
/// computing on `f64` would otherwise leak into the page.
pub trait JsonRender {
    fn render(&self) -> String;
}

impl JsonRender for Json {
    fn render(&self) -> String {
        match *self {
            Json::Null => String::new(),
            Json::Bool(b) => b.to_string(),
            Json::Number(ref n) => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
                _ => n.to_string(),
            },
            Json::String(ref s) => s.clone(),
            Json::Array(_) | Json::Object(_) => self.to_string(),
        }
    }
}

/// Javascript-style truthiness, the rule conditions and bare expression
/// leaves are decided by.
pub trait JsonTruthy {
    fn is_truthy(&self) -> bool;
}

impl JsonTruthy for Json {
    fn is_truthy(&self) -> bool {
        match *self {
            Json::Null => false,
            Json::Bool(b) => b,
            Json::Number(ref n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
            Json::String(ref s) => !s.is_empty(),
            Json::Array(_) | Json::Object(_) => true,
        }
    }
}

pub fn to_json<T>(src: &T) -> Json
where
    T: Serialize,
{
    to_value(src).unwrap_or(Json::Null)
}

/// Numeric coercion for loose comparison: numbers, booleans and numeric
/// strings take part, everything else is incomparable.
fn coerce_number(v: &Json) -> Option<f64> {
    match *v {
        Json::Number(ref n) => n.as_f64(),
        Json::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
        Json::String(ref s) => {
            let t = s.trim();
            if t.is_empty() {
                Some(0.0)
            } else {
                t.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

/// Loose equality (`=` / `==`): scalar values compare after numeric
/// coercion; `Null` equals only `Null`.
pub(crate) fn loose_eq(a: &Json, b: &Json) -> bool {
    if strict_eq(a, b) {
        return true;
    }
    match (a, b) {
        (Json::Null, _) | (_, Json::Null) => false,
        (Json::Array(_), _) | (_, Json::Array(_)) => false,
        (Json::Object(_), _) | (_, Json::Object(_)) => false,
        _ => match (coerce_number(a), coerce_number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// Strict equality (`===`): same value and same type, with integer and
/// float representations of the same number unified.
pub(crate) fn strict_eq(a: &Json, b: &Json) -> bool {
    match (a, b) {
        (Json::Number(x), Json::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Ordered comparison (`<`, `>`, `<=`, `>=`): two strings compare
/// lexicographically, anything else through numeric coercion with `Null`
/// as zero. Incomparable pairs answer `false` to every ordering.
pub(crate) fn ordered_cmp(a: &Json, b: &Json) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Json::String(x), Json::String(y)) => Some(x.cmp(y)),
        _ => {
            let x = match a {
                Json::Null => Some(0.0),
                _ => coerce_number(a),
            };
            let y = match b {
                Json::Null => Some(0.0),
                _ => coerce_number(b),
            };
            match (x, y) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            }
        }
    }
}
