use std::cmp::Ordering;

use log::{debug, trace};
use serde_json::value::Value as Json;

use crate::context::{Context, Object};
use crate::error::RenderError;
use crate::grammar::{CompareOp, Condition, Instruction};
use crate::output::{Output, StringOutput};
use crate::registry::Registry;
use crate::template::{Block, Template};
use crate::value::{loose_eq, ordered_cmp, strict_eq, JsonRender, JsonTruthy};

/// Out-of-band control signal of walking a block list.
///
/// The first non-`None` signal skips every remaining sibling and travels
/// upward until the nearest enclosing loop consumes it: `Break` ends the
/// loop, `Continue` is absorbed at the loop boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    None,
    Continue,
    Break,
}

/// Render trait
pub trait Renderable {
    /// Render into an [`Output`], reporting the control signal the walk
    /// ended with.
    fn render(
        &self,
        registry: &Registry,
        ctx: &Context,
        out: &mut dyn Output,
    ) -> Result<Signal, RenderError>;

    /// Render into a string, discarding the control signal.
    fn renders(&self, registry: &Registry, ctx: &Context) -> Result<String, RenderError> {
        let mut out = StringOutput::new();
        self.render(registry, ctx, &mut out)?;
        out.into_string().map_err(RenderError::with)
    }
}

impl Renderable for Template {
    fn render(
        &self,
        registry: &Registry,
        ctx: &Context,
        out: &mut dyn Output,
    ) -> Result<Signal, RenderError> {
        render_blocks(&self.elements, registry, ctx, out)
    }
}

/// Evaluate one pipe-delimited expression chain against the payload,
/// with the implicit trailing html-escape stage.
pub(crate) fn eval_sentence(
    expr: &str,
    registry: &Registry,
    ctx: &Context,
) -> Result<Json, RenderError> {
    eval_pipeline(expr, registry, ctx, true)
}

fn eval_pipeline(
    expr: &str,
    registry: &Registry,
    ctx: &Context,
    escape: bool,
) -> Result<Json, RenderError> {
    let mut stages: Vec<&str> = expr.split('|').collect();
    if escape && stages.last() != Some(&"raw") {
        stages.push("encode");
    }

    let mut acc = Json::Null;
    for stage in stages {
        acc = eval_stage(stage, acc, registry, ctx)?;
    }
    Ok(acc)
}

/// Strip the first and last character: the quote delimiters of a string
/// literal stage.
fn strip_quotes(stage: &str) -> &str {
    let inner = &stage[1..];
    match inner.char_indices().last() {
        Some((idx, _)) => &inner[..idx],
        None => "",
    }
}

fn eval_stage(
    stage: &str,
    acc: Json,
    registry: &Registry,
    ctx: &Context,
) -> Result<Json, RenderError> {
    if stage.starts_with('"') || stage.starts_with('\'') {
        return Ok(Json::String(strip_quotes(stage).to_owned()));
    }

    // a stage that reads as a JSON scalar is a literal, not a path
    if let Ok(literal) = serde_json::from_str::<Json>(stage) {
        if !matches!(literal, Json::Array(_) | Json::Object(_)) {
            return Ok(literal);
        }
    }

    if let Some(paren) = stage.find('(') {
        let name = &stage[..paren];
        let raw_args = stage[paren + 1..].trim_end_matches(')');
        let args: Vec<Json> = if raw_args.is_empty() {
            Vec::new()
        } else {
            raw_args
                .split(',')
                .map(|a| Json::String(a.to_owned()))
                .collect()
        };
        match registry.get_helper(name) {
            Some(helper) => helper.call(&acc, &args),
            None => {
                trace!("no helper {:?} for stage {:?}", name, stage);
                Ok(Json::Null)
            }
        }
    } else {
        match ctx.navigate(stage) {
            Some(value) => Ok(value.clone()),
            None => match registry.get_helper(stage) {
                Some(helper) => helper.call(&acc, &[]),
                None => {
                    trace!("stage {:?} resolved to nothing", stage);
                    Ok(Json::Null)
                }
            },
        }
    }
}

/// Evaluate a condition tree to a boolean. AND and OR short-circuit, in
/// value order, so a side-effecting helper in a later term never runs
/// once the outcome is known.
pub(crate) fn eval_condition(
    condition: &Condition,
    registry: &Registry,
    ctx: &Context,
) -> Result<bool, RenderError> {
    match *condition {
        Condition::And(ref values) => {
            for v in values {
                if !eval_condition(v, registry, ctx)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Condition::Or(ref values) => {
            for v in values {
                if eval_condition(v, registry, ctx)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Condition::Truthy(ref expr) => Ok(eval_sentence(expr, registry, ctx)?.is_truthy()),
        Condition::Compare(ref inst) => eval_instruction(inst, registry, ctx),
    }
}

fn eval_instruction(
    inst: &Instruction,
    registry: &Registry,
    ctx: &Context,
) -> Result<bool, RenderError> {
    let resolve = |operand: &Option<String>| -> Result<Json, RenderError> {
        match *operand {
            Some(ref expr) => {
                eval_sentence(expr, registry, ctx).map_err(|e| e.at(expr, inst.offset))
            }
            None => Ok(Json::Null),
        }
    };

    if inst.op == CompareOp::Not {
        return Ok(!resolve(&inst.right)?.is_truthy());
    }

    let left = resolve(&inst.left)?;
    let right = resolve(&inst.right)?;
    let result = match inst.op {
        CompareOp::Eq | CompareOp::DoubleEq => loose_eq(&left, &right),
        CompareOp::StrictEq => strict_eq(&left, &right),
        CompareOp::NotEq => !loose_eq(&left, &right),
        CompareOp::StrictNotEq => !strict_eq(&left, &right),
        CompareOp::Less => ordered_cmp(&left, &right) == Some(Ordering::Less),
        CompareOp::Greater => ordered_cmp(&left, &right) == Some(Ordering::Greater),
        CompareOp::LessEq => {
            matches!(ordered_cmp(&left, &right), Some(Ordering::Less | Ordering::Equal))
        }
        CompareOp::GreaterEq => {
            matches!(ordered_cmp(&left, &right), Some(Ordering::Greater | Ordering::Equal))
        }
        CompareOp::Not => unreachable!("handled above"),
    };
    Ok(result)
}

fn offset_hint(mut e: RenderError, offset: usize) -> RenderError {
    if e.offset.is_none() {
        e.offset = Some(offset);
    }
    e
}

/// Walk one sibling list left to right. If/ElseIf/Else exclusivity is
/// threaded through `last_branch`; the first non-`None` signal returns
/// immediately, skipping the remaining siblings.
pub(crate) fn render_blocks(
    blocks: &[Block],
    registry: &Registry,
    ctx: &Context,
    out: &mut dyn Output,
) -> Result<Signal, RenderError> {
    let mut last_branch = false;

    for block in blocks {
        match *block {
            Block::Text(ref text) => out.write(text)?,
            Block::Output { ref expr, offset } => {
                let value =
                    eval_sentence(expr, registry, ctx).map_err(|e| e.at(expr, offset))?;
                out.write(&value.render())?;
            }
            Block::If {
                ref condition,
                ref children,
                offset,
            } => {
                let hit = eval_condition(condition, registry, ctx)
                    .map_err(|e| offset_hint(e, offset))?;
                last_branch = hit;
                if hit {
                    let signal = render_blocks(children, registry, ctx, out)?;
                    if signal != Signal::None {
                        return Ok(signal);
                    }
                }
            }
            Block::ElseIf {
                ref condition,
                ref children,
                offset,
            } => {
                if !last_branch {
                    let hit = eval_condition(condition, registry, ctx)
                        .map_err(|e| offset_hint(e, offset))?;
                    last_branch = hit;
                    if hit {
                        let signal = render_blocks(children, registry, ctx, out)?;
                        if signal != Signal::None {
                            return Ok(signal);
                        }
                    }
                }
            }
            Block::Else { ref children } => {
                if !last_branch {
                    let signal = render_blocks(children, registry, ctx, out)?;
                    if signal != Signal::None {
                        return Ok(signal);
                    }
                }
            }
            Block::Each {
                ref var,
                ref collection,
                ref children,
                offset,
            } => {
                // the collection resolves unescaped
                let value = eval_pipeline(collection, registry, ctx, false)
                    .map_err(|e| e.at(collection, offset))?;
                match value {
                    Json::Array(ref items) => {
                        debug!("iterating {} items as {:?}", items.len(), var);
                        for (index, item) in items.iter().enumerate() {
                            let signal = render_iteration(
                                children,
                                registry,
                                ctx,
                                out,
                                var,
                                item,
                                index.to_string(),
                            )?;
                            if signal == Signal::Break {
                                break;
                            }
                        }
                    }
                    Json::Object(ref map) => {
                        for (key, item) in map.iter() {
                            let signal = render_iteration(
                                children,
                                registry,
                                ctx,
                                out,
                                var,
                                item,
                                key.clone(),
                            )?;
                            if signal == Signal::Break {
                                break;
                            }
                        }
                    }
                    ref other => {
                        trace!("expression {:?} is not iterable: {:?}", collection, other);
                    }
                }
            }
            Block::Continue => return Ok(Signal::Continue),
            Block::Break => return Ok(Signal::Break),
        }
    }

    Ok(Signal::None)
}

/// One loop iteration in a fresh scope: the loop variable and `$index`
/// merged over the outer payload. `Continue` has already done its work by
/// skipping the rest of the body, so only `Break` is reported upward.
fn render_iteration(
    children: &[Block],
    registry: &Registry,
    ctx: &Context,
    out: &mut dyn Output,
    var: &str,
    item: &Json,
    index: String,
) -> Result<Signal, RenderError> {
    let mut bindings = Object::new();
    bindings.insert(var.to_owned(), item.clone());
    bindings.insert("$index".to_owned(), Json::String(index));
    let scope = ctx.derive_with(&bindings);
    render_blocks(children, registry, &scope, out)
}
