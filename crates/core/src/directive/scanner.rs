use std::ops::Range;

/// Every directive opens with this prefix; the keyword match is
/// case-sensitive end to end.
const DIRECTIVE_OPEN: &str = "[ACTION:";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectiveKind {
    AddToQuote,
    RemoveFromQuote,
}

impl DirectiveKind {
    fn from_keyword(raw: &str) -> Option<Self> {
        match raw {
            "ADD_TO_QUOTE" => Some(Self::AddToQuote),
            "REMOVE_FROM_QUOTE" => Some(Self::RemoveFromQuote),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::AddToQuote => "ADD_TO_QUOTE",
            Self::RemoveFromQuote => "REMOVE_FROM_QUOTE",
        }
    }
}

/// One raw grammar match. Field values are captured as free text; charset
/// and range policy belong to the validator, so a recognized-but-invalid
/// directive still carries the span needed to strip it from display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawDirective {
    pub kind: DirectiveKind,
    pub raw_sku: String,
    pub raw_quantity: Option<String>,
    /// Byte offsets of the whole bracketed substring, end-exclusive.
    pub span: Range<usize>,
}

/// Lazy left-to-right scan over a text blob. Matches are non-overlapping;
/// bracket content that does not fully match the grammar is skipped and left
/// in the text. Directive-free text yields nothing.
pub struct DirectiveScanner<'a> {
    text: &'a str,
    cursor: usize,
}

impl<'a> DirectiveScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, cursor: 0 }
    }
}

impl Iterator for DirectiveScanner<'_> {
    type Item = RawDirective;

    fn next(&mut self) -> Option<RawDirective> {
        while self.cursor < self.text.len() {
            let offset = self.text[self.cursor..].find(DIRECTIVE_OPEN)?;
            let start = self.cursor + offset;
            match parse_directive_at(self.text, start) {
                Some(directive) => {
                    self.cursor = directive.span.end;
                    return Some(directive);
                }
                None => {
                    self.cursor = start + 1;
                }
            }
        }
        None
    }
}

fn parse_directive_at(text: &str, start: usize) -> Option<RawDirective> {
    let body_start = start + DIRECTIVE_OPEN.len();
    let body = &text[body_start..];

    let keyword_end = body.find([',', ']'])?;
    if body.as_bytes()[keyword_end] == b']' {
        // both directive kinds require at least a SKU field
        return None;
    }
    let kind = DirectiveKind::from_keyword(body[..keyword_end].trim())?;
    let mut pos = keyword_end + 1;
    pos += leading_whitespace(&body[pos..]);

    if !body[pos..].starts_with("SKU:") {
        return None;
    }
    pos += "SKU:".len();

    match kind {
        DirectiveKind::AddToQuote => {
            let sku_end = pos + body[pos..].find([',', ']'])?;
            if body.as_bytes()[sku_end] == b']' {
                // missing QUANTITY field
                return None;
            }
            let raw_sku = body[pos..sku_end].trim().to_string();
            pos = sku_end + 1;
            pos += leading_whitespace(&body[pos..]);

            if !body[pos..].starts_with("QUANTITY:") {
                return None;
            }
            pos += "QUANTITY:".len();

            let quantity_end = pos + body[pos..].find(']')?;
            if body[pos..quantity_end].contains(',') {
                // trailing fields are not part of the grammar
                return None;
            }
            let raw_quantity = body[pos..quantity_end].trim().to_string();
            let end = body_start + quantity_end + 1;
            Some(RawDirective { kind, raw_sku, raw_quantity: Some(raw_quantity), span: start..end })
        }
        DirectiveKind::RemoveFromQuote => {
            let sku_end = pos + body[pos..].find(']')?;
            if body[pos..sku_end].contains(',') {
                return None;
            }
            let raw_sku = body[pos..sku_end].trim().to_string();
            let end = body_start + sku_end + 1;
            Some(RawDirective { kind, raw_sku, raw_quantity: None, span: start..end })
        }
    }
}

fn leading_whitespace(segment: &str) -> usize {
    segment.bytes().take_while(|byte| byte.is_ascii_whitespace()).count()
}
