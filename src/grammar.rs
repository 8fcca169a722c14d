use log::trace;

use crate::error::{TemplateError, TemplateErrorReason};

/// Parenthesis/directive nesting bound; a hostile template must not be
/// able to drive the recursive parser or evaluator arbitrarily deep.
pub const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Less,
    Greater,
    Eq,
    DoubleEq,
    StrictEq,
    LessEq,
    GreaterEq,
    Not,
    NotEq,
    StrictNotEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// A comparison leaf. Operands are unparsed expression strings, resolved
/// by the sentence evaluator at render time. `offset` is the operator's
/// position inside the (whitespace-stripped) condition text, carried into
/// render errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub left: Option<String>,
    pub right: Option<String>,
    pub op: CompareOp,
    pub offset: usize,
}

/// A parsed condition tree. A nesting level that never acquires a
/// combinator collapses to its single value, so no transparent wrapper
/// node survives into the compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Compare(Instruction),
    Truthy(String),
}

fn single_op(c: char) -> CompareOp {
    match c {
        '<' => CompareOp::Less,
        '>' => CompareOp::Greater,
        '=' => CompareOp::Eq,
        _ => CompareOp::Not,
    }
}

/// Incremental operator composition: adjacent single characters promote
/// into the matching multi-character operator, any other pairing restarts
/// from the new character.
fn promote(current: CompareOp, c: char) -> CompareOp {
    use self::CompareOp::*;
    match (current, c) {
        (Eq, '=') => DoubleEq,
        (DoubleEq, '=') => StrictEq,
        (Less, '=') => LessEq,
        (Greater, '=') => GreaterEq,
        (Not, '=') => NotEq,
        (NotEq, '=') => StrictNotEq,
        _ => single_op(c),
    }
}

/// Push the pending word or comparison into the values list. Called on a
/// combinator, a close paren and the end of input.
fn finalize_term(word: &mut String, instruction: &mut Option<Instruction>, values: &mut Vec<Condition>) {
    if let Some(mut inst) = instruction.take() {
        if !word.is_empty() {
            inst.right = Some(std::mem::take(word));
        }
        values.push(Condition::Compare(inst));
    } else if !word.is_empty() {
        values.push(Condition::Truthy(std::mem::take(word)));
    }
}

fn close_level(op: Option<LogicalOp>, values: Vec<Condition>) -> Condition {
    match op {
        None => values
            .into_iter()
            .next()
            .unwrap_or_else(|| Condition::Truthy(String::new())),
        Some(LogicalOp::And) => Condition::And(values),
        Some(LogicalOp::Or) => Condition::Or(values),
    }
}

/// Parse a boolean/comparison expression into a [`Condition`] tree.
///
/// The expression is expected whitespace-stripped. Combinators are not
/// precedence-aware: consecutive same-operator terms flatten into one
/// node, an operator switch wraps the level built so far as the first
/// value of a new level, so `a&b|c` parses as `(a&b)|c`. Parentheses are
/// the only way to group differently.
pub fn parse_condition(input: &str) -> Result<Condition, TemplateError> {
    let chars: Vec<char> = input.chars().collect();
    let (condition, _) = parse_level(&chars, 0, 0)?;
    trace!("condition {:?} parsed from {:?}", condition, input);
    Ok(condition)
}

/// One nesting level. Returns the built node together with the index of
/// the `)` (or end of input) it stopped at, so recursion needs no shared
/// cursor state.
fn parse_level(
    chars: &[char],
    start: usize,
    depth: usize,
) -> Result<(Condition, usize), TemplateError> {
    if depth > MAX_NESTING {
        return Err(TemplateError::of(TemplateErrorReason::TooDeep(MAX_NESTING)));
    }

    let mut word = String::new();
    let mut instruction: Option<Instruction> = None;
    let mut op: Option<LogicalOp> = None;
    let mut values: Vec<Condition> = Vec::new();

    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            ')' => {
                finalize_term(&mut word, &mut instruction, &mut values);
                return Ok((close_level(op, values), i));
            }
            '(' => {
                let (inner, stop) = parse_level(chars, i + 1, depth + 1)?;
                values.push(inner);
                word.clear();
                i = stop;
            }
            c @ ('&' | '|') => {
                finalize_term(&mut word, &mut instruction, &mut values);
                let next_op = if c == '&' { LogicalOp::And } else { LogicalOp::Or };
                match op {
                    Some(current) if current != next_op => {
                        // switch of combinator: nest what we have so far
                        let wrapped = close_level(Some(current), std::mem::take(&mut values));
                        values.push(wrapped);
                        op = Some(next_op);
                    }
                    _ => op = Some(next_op),
                }
            }
            c @ ('<' | '>' | '=' | '!') => {
                match instruction {
                    Some(ref mut inst) => {
                        if inst.left.is_none() && !word.is_empty() {
                            inst.left = Some(std::mem::take(&mut word));
                        }
                        inst.op = promote(inst.op, c);
                    }
                    None => {
                        let left = if word.is_empty() {
                            None
                        } else {
                            Some(std::mem::take(&mut word))
                        };
                        instruction = Some(Instruction {
                            left,
                            right: None,
                            op: single_op(c),
                            offset: i,
                        });
                    }
                }
                word.clear();
            }
            c => word.push(c),
        }
        i += 1;
    }

    finalize_term(&mut word, &mut instruction, &mut values);
    Ok((close_level(op, values), chars.len()))
}

/// Parse a `for`/`foreach` header: `<var> in <collectionExpr>`. The
/// middle token is deliberately unchecked, any other shape is rejected.
pub fn parse_each_header(header: &str) -> Result<(String, String), TemplateError> {
    let tokens: Vec<&str> = header.split(' ').collect();
    match tokens.as_slice() {
        [var, _, collection] if !var.is_empty() && !collection.is_empty() => {
            Ok(((*var).to_owned(), (*collection).to_owned()))
        }
        _ => Err(TemplateError::of(TemplateErrorReason::InvalidLoopHeader(
            header.to_owned(),
        ))),
    }
}

#[cfg(test)]
mod test {
    use crate::error::TemplateErrorReason;
    use crate::grammar::{parse_condition, parse_each_header, CompareOp, Condition, Instruction};

    fn compare(left: &str, op: CompareOp, right: &str, offset: usize) -> Condition {
        Condition::Compare(Instruction {
            left: if left.is_empty() { None } else { Some(left.to_owned()) },
            right: if right.is_empty() { None } else { Some(right.to_owned()) },
            op,
            offset,
        })
    }

    fn truthy(s: &str) -> Condition {
        Condition::Truthy(s.to_owned())
    }

    #[test]
    fn test_operator_promotion() {
        assert_eq!(parse_condition("a=1").unwrap(), compare("a", CompareOp::Eq, "1", 1));
        assert_eq!(parse_condition("a==1").unwrap(), compare("a", CompareOp::DoubleEq, "1", 1));
        assert_eq!(parse_condition("a===1").unwrap(), compare("a", CompareOp::StrictEq, "1", 1));
        assert_eq!(parse_condition("a<=1").unwrap(), compare("a", CompareOp::LessEq, "1", 1));
        assert_eq!(parse_condition("a>=1").unwrap(), compare("a", CompareOp::GreaterEq, "1", 1));
        assert_eq!(parse_condition("a!=1").unwrap(), compare("a", CompareOp::NotEq, "1", 1));
        assert_eq!(
            parse_condition("name!==null").unwrap(),
            compare("name", CompareOp::StrictNotEq, "null", 4)
        );
        assert_eq!(parse_condition("a<b").unwrap(), compare("a", CompareOp::Less, "b", 1));
    }

    #[test]
    fn test_negation() {
        assert_eq!(
            parse_condition("!m.name").unwrap(),
            compare("", CompareOp::Not, "m.name", 0)
        );
    }

    #[test]
    fn test_bare_word() {
        assert_eq!(parse_condition("name").unwrap(), truthy("name"));
        assert_eq!(parse_condition("").unwrap(), truthy(""));
    }

    #[test]
    fn test_same_operator_flattens() {
        assert_eq!(
            parse_condition("a&b&c").unwrap(),
            Condition::And(vec![truthy("a"), truthy("b"), truthy("c")])
        );
    }

    #[test]
    fn test_operator_switch_nests_left_to_right() {
        // no AND-over-OR precedence: `a&b|c` is `(a&b)|c`
        assert_eq!(
            parse_condition("a&b|c").unwrap(),
            Condition::Or(vec![
                Condition::And(vec![truthy("a"), truthy("b")]),
                truthy("c"),
            ])
        );
        assert_eq!(
            parse_condition("a|b&c").unwrap(),
            Condition::And(vec![
                Condition::Or(vec![truthy("a"), truthy("b")]),
                truthy("c"),
            ])
        );
    }

    #[test]
    fn test_parenthesized_grouping() {
        assert_eq!(
            parse_condition("a&(b|c)").unwrap(),
            Condition::And(vec![
                truthy("a"),
                Condition::Or(vec![truthy("b"), truthy("c")]),
            ])
        );
        // a transparent level collapses to its single value
        assert_eq!(parse_condition("((a))").unwrap(), truthy("a"));
    }

    #[test]
    fn test_comparison_inside_combinator() {
        let parsed = parse_condition("name!==null&name2!==\"tutu\"").unwrap();
        match parsed {
            Condition::And(values) => {
                assert_eq!(values.len(), 2);
                assert!(matches!(
                    values[0],
                    Condition::Compare(Instruction { op: CompareOp::StrictNotEq, .. })
                ));
                assert_eq!(
                    values[1],
                    compare("name2", CompareOp::StrictNotEq, "\"tutu\"", 17)
                );
            }
            other => panic!("AND expected, got {:?}", other),
        }
    }

    #[test]
    fn test_nesting_limit() {
        let deep = "(".repeat(80) + "a" + &")".repeat(80);
        let err = parse_condition(&deep).unwrap_err();
        assert!(matches!(err.reason, TemplateErrorReason::TooDeep(_)));
    }

    #[test]
    fn test_each_header() {
        assert_eq!(
            parse_each_header("m in orders").unwrap(),
            ("m".to_owned(), "orders".to_owned())
        );
        // the middle token is not validated
        assert_eq!(
            parse_each_header("m of orders").unwrap(),
            ("m".to_owned(), "orders".to_owned())
        );
        assert!(parse_each_header("orders").is_err());
        assert!(parse_each_header("m in").is_err());
        assert!(parse_each_header("a b c d").is_err());
    }
}
