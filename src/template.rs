use log::debug;

use crate::error::{TemplateError, TemplateErrorReason};
use crate::grammar::{parse_condition, parse_each_header, Condition, MAX_NESTING};
use crate::scanner::Scanner;
use crate::support::str::{collapse_whitespace, strip_whitespace};

/// One node of a compiled template: literal text, an output expression,
/// or a control construct. If/ElseIf/Else branches of a chain sit next to
/// each other in the same sibling list; `Each` covers both the `for` and
/// `foreach` keywords.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(String),
    Output {
        expr: String,
        offset: usize,
    },
    If {
        condition: Condition,
        children: Vec<Block>,
        offset: usize,
    },
    ElseIf {
        condition: Condition,
        children: Vec<Block>,
        offset: usize,
    },
    Else {
        children: Vec<Block>,
    },
    Each {
        var: String,
        collection: String,
        children: Vec<Block>,
        offset: usize,
    },
    Continue,
    Break,
}

/// A compiled template. Built once, immutable afterwards, safe to render
/// repeatedly and concurrently against different payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: Option<String>,
    pub elements: Vec<Block>,
}

/// What ended a nesting level of the block builder.
enum Closer {
    Fi { offset: usize },
    End { offset: usize },
    Else { offset: usize },
    ElseIf { condition: Condition, offset: usize },
    Eof,
}

impl Closer {
    fn name(&self) -> &'static str {
        match *self {
            Closer::Fi { .. } => "fi",
            Closer::End { .. } => "end",
            Closer::Else { .. } => "else",
            Closer::ElseIf { .. } => "else if",
            Closer::Eof => "end of file",
        }
    }
}

fn positioned(e: TemplateError, source: &str, offset: usize) -> TemplateError {
    if e.offset.is_none() {
        e.at(source, offset)
    } else {
        e
    }
}

/// Maximal run of word characters at the start of the trimmed enclosed
/// text; this is what gets matched against the reserved directive words.
fn leading_word(s: &str) -> &str {
    let end = s
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(s.len());
    &s[..end]
}

struct BlockBuilder<'a> {
    source: &'a str,
    matches: Scanner<'a>,
    last_index: usize,
}

impl<'a> BlockBuilder<'a> {
    fn new(source: &'a str) -> BlockBuilder<'a> {
        BlockBuilder {
            source,
            matches: Scanner::new(source),
            last_index: 0,
        }
    }

    /// Build one nesting level until a closing directive or the end of
    /// input. The caller decides which closers are legal in its position.
    fn parse_blocks(&mut self, depth: usize) -> Result<(Vec<Block>, Closer), TemplateError> {
        if depth > MAX_NESTING {
            return Err(TemplateError::of(TemplateErrorReason::TooDeep(MAX_NESTING)));
        }

        let mut blocks: Vec<Block> = Vec::new();

        while let Some(m) = self.matches.next() {
            if m.start > self.last_index {
                blocks.push(Block::Text(self.source[self.last_index..m.start].to_owned()));
            }
            self.last_index = m.start + m.len;

            let sentence = collapse_whitespace(m.inner);
            match leading_word(&sentence) {
                "if" => {
                    let header = strip_whitespace(&sentence["if".len()..]);
                    let condition = parse_condition(&header)
                        .map_err(|e| positioned(e, self.source, m.start))?;
                    let chain = self
                        .parse_if_chain(condition, m.start, depth)
                        .map_err(|e| positioned(e, self.source, m.start))?;
                    blocks.extend(chain);
                }
                keyword @ ("for" | "foreach") => {
                    let header = sentence[keyword.len()..].trim_start().to_owned();
                    let (var, collection) = parse_each_header(&header)
                        .map_err(|e| positioned(e, self.source, m.start))?;
                    let (children, closer) = self
                        .parse_blocks(depth + 1)
                        .map_err(|e| positioned(e, self.source, m.start))?;
                    match closer {
                        Closer::End { .. } => blocks.push(Block::Each {
                            var,
                            collection,
                            children,
                            offset: m.start,
                        }),
                        Closer::Eof => {
                            return Err(TemplateError::of(TemplateErrorReason::Unclosed(
                                keyword.to_owned(),
                            ))
                            .at(self.source, m.start))
                        }
                        other => {
                            return Err(TemplateError::of(TemplateErrorReason::MismatchedCloser(
                                keyword.to_owned(),
                                other.name().to_owned(),
                            ))
                            .at(self.source, self.last_index))
                        }
                    }
                }
                "else" => {
                    let closer = if sentence.starts_with("else if") {
                        let header = strip_whitespace(&sentence["else if".len()..]);
                        let condition = parse_condition(&header)
                            .map_err(|e| positioned(e, self.source, m.start))?;
                        Closer::ElseIf {
                            condition,
                            offset: m.start,
                        }
                    } else {
                        Closer::Else { offset: m.start }
                    };
                    return Ok((blocks, closer));
                }
                "fi" => return Ok((blocks, Closer::Fi { offset: m.start })),
                "end" => return Ok((blocks, Closer::End { offset: m.start })),
                "continue" => blocks.push(Block::Continue),
                "break" => blocks.push(Block::Break),
                _ => blocks.push(Block::Output {
                    expr: strip_whitespace(&sentence),
                    offset: m.start,
                }),
            }
        }

        if self.last_index < self.source.len() {
            blocks.push(Block::Text(self.source[self.last_index..].to_owned()));
        }
        Ok((blocks, Closer::Eof))
    }

    /// Build an `if` chain: the opening branch, any `else if` branches, an
    /// optional final `else`, closed by `fi`.
    fn parse_if_chain(
        &mut self,
        condition: Condition,
        offset: usize,
        depth: usize,
    ) -> Result<Vec<Block>, TemplateError> {
        let mut chain: Vec<Block> = Vec::new();

        let (children, mut closer) = self.parse_blocks(depth + 1)?;
        chain.push(Block::If {
            condition,
            children,
            offset,
        });

        loop {
            match closer {
                Closer::ElseIf {
                    condition,
                    offset: branch_offset,
                } => {
                    let (children, next) = self.parse_blocks(depth + 1)?;
                    chain.push(Block::ElseIf {
                        condition,
                        children,
                        offset: branch_offset,
                    });
                    closer = next;
                }
                Closer::Else { .. } => {
                    let (children, next) = self.parse_blocks(depth + 1)?;
                    chain.push(Block::Else { children });
                    return match next {
                        Closer::Fi { .. } => Ok(chain),
                        Closer::Eof => Err(TemplateError::of(TemplateErrorReason::Unclosed(
                            "if".to_owned(),
                        ))
                        .at(self.source, offset)),
                        Closer::Else { offset: o } | Closer::ElseIf { offset: o, .. } => {
                            Err(TemplateError::of(TemplateErrorReason::DanglingElse(
                                next.name().to_owned(),
                            ))
                            .at(self.source, o))
                        }
                        Closer::End { offset: o } => {
                            Err(TemplateError::of(TemplateErrorReason::MismatchedCloser(
                                "if".to_owned(),
                                "end".to_owned(),
                            ))
                            .at(self.source, o))
                        }
                    };
                }
                Closer::Fi { .. } => return Ok(chain),
                Closer::End { offset: o } => {
                    return Err(TemplateError::of(TemplateErrorReason::MismatchedCloser(
                        "if".to_owned(),
                        "end".to_owned(),
                    ))
                    .at(self.source, o))
                }
                Closer::Eof => {
                    return Err(
                        TemplateError::of(TemplateErrorReason::Unclosed("if".to_owned()))
                            .at(self.source, offset),
                    )
                }
            }
        }
    }
}

impl Template {
    pub fn compile<S: AsRef<str>>(source: S) -> Result<Template, TemplateError> {
        let source = source.as_ref();
        let mut builder = BlockBuilder::new(source);
        let (elements, closer) = builder.parse_blocks(0)?;
        match closer {
            Closer::Eof => {}
            Closer::Fi { offset } | Closer::End { offset } => {
                return Err(TemplateError::of(TemplateErrorReason::StrayCloser(
                    closer.name().to_owned(),
                ))
                .at(source, offset))
            }
            Closer::Else { offset } | Closer::ElseIf { offset, .. } => {
                return Err(TemplateError::of(TemplateErrorReason::DanglingElse(
                    closer.name().to_owned(),
                ))
                .at(source, offset))
            }
        }
        debug!("template compiled into {} top level blocks", elements.len());
        Ok(Template {
            name: None,
            elements,
        })
    }

    pub fn compile_with_name<S: AsRef<str>>(
        source: S,
        name: String,
    ) -> Result<Template, TemplateError> {
        let mut t = Template::compile(source)?;
        t.name = Some(name);
        Ok(t)
    }
}
