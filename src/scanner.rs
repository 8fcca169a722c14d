/// One `{{ ... }}` region found in the template source.
///
/// `start` and `len` span the whole delimited region including braces;
/// `inner` is the enclosed text between them, untrimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMatch<'a> {
    pub inner: &'a str,
    pub start: usize,
    pub len: usize,
}

/// Scans template text for delimited expression regions, in order.
///
/// Anchoring rule: a region starts at the first `{{` pair that is not
/// immediately followed by a third `{`. Extra leading braces are left to
/// the caller as literal text, so `{{{ x }}` yields the ` x ` region
/// starting one byte in. There is no triple-brace raw syntax.
///
/// A candidate without a closing `}}` on the same line is not a region;
/// scanning resumes at the next candidate.
pub struct Scanner<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner { source, pos: 0 }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = DirectiveMatch<'a>;

    fn next(&mut self) -> Option<DirectiveMatch<'a>> {
        let bytes = self.source.as_bytes();
        let mut from = self.pos;

        while let Some(found) = self.source[from..].find("{{") {
            let open = from + found;
            let body = open + 2;

            // anchor to the first `{{` not followed by another `{`
            if bytes.get(body) == Some(&b'{') {
                from = open + 1;
                continue;
            }

            let close = match self.source[body..].find("}}") {
                Some(rel) => body + rel,
                // no closer anywhere ahead, the rest is literal text
                None => break,
            };

            if self.source[body..close].contains('\n') {
                from = open + 1;
                continue;
            }

            self.pos = close + 2;
            return Some(DirectiveMatch {
                inner: &self.source[body..close],
                start: open,
                len: self.pos - open,
            });
        }

        self.pos = self.source.len();
        None
    }
}
