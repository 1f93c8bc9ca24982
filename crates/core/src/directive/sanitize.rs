use std::ops::Range;

/// Removes every recognized directive span from `text` by exact byte
/// offsets, then smooths the seams: where a removal leaves whitespace on
/// both sides only one run survives, and the result is trimmed. Removal is
/// span-based rather than content-based so textually identical substrings
/// outside a directive are never touched. Spans must be non-overlapping and
/// ascending, as the scanner produces them.
pub fn strip_spans(text: &str, spans: &[Range<usize>]) -> String {
    if spans.is_empty() {
        return text.trim().to_string();
    }

    let mut cleaned = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in spans {
        push_segment(&mut cleaned, &text[cursor..span.start]);
        cursor = span.end;
    }
    push_segment(&mut cleaned, &text[cursor..]);
    cleaned.trim().to_string()
}

fn push_segment(cleaned: &mut String, segment: &str) {
    let segment = if cleaned.ends_with(|c: char| c.is_whitespace()) {
        segment.trim_start()
    } else {
        segment
    };
    cleaned.push_str(segment);
}

#[cfg(test)]
mod tests {
    use crate::directive::scanner::DirectiveScanner;

    use super::strip_spans;

    fn sanitize(text: &str) -> String {
        let spans: Vec<_> = DirectiveScanner::new(text).map(|raw| raw.span).collect();
        strip_spans(text, &spans)
    }

    #[test]
    fn directive_free_text_is_returned_trimmed_and_unchanged() {
        assert_eq!(sanitize("  Happy to help!  "), "Happy to help!");
        assert_eq!(sanitize("Two  spaces stay."), "Two  spaces stay.");
    }

    #[test]
    fn removal_collapses_the_surrounding_whitespace() {
        let text = "Add these: [ACTION:ADD_TO_QUOTE, SKU:ITEM-1, QUANTITY:1] and \
                    [ACTION:ADD_TO_QUOTE, SKU:ITEM-2, QUANTITY:2]";
        assert_eq!(sanitize(text), "Add these: and");
    }

    #[test]
    fn leading_and_trailing_directives_leave_no_padding() {
        assert_eq!(sanitize("[ACTION:REMOVE_FROM_QUOTE, SKU:ITEM-1] done"), "done");
        assert_eq!(sanitize("done [ACTION:REMOVE_FROM_QUOTE, SKU:ITEM-1]"), "done");
        assert_eq!(sanitize("[ACTION:REMOVE_FROM_QUOTE, SKU:ITEM-1]"), "");
    }

    #[test]
    fn sanitizing_sanitized_output_is_a_no_op() {
        let text = "Sure. [ACTION:ADD_TO_QUOTE, SKU:ITEM-1, QUANTITY:4] Anything else?";
        let once = sanitize(text);
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn identical_text_outside_a_directive_is_untouched() {
        let text = "SKU:ITEM-1 looks right. [ACTION:REMOVE_FROM_QUOTE, SKU:ITEM-1]";
        assert_eq!(sanitize(text), "SKU:ITEM-1 looks right.");
    }

    #[test]
    fn rejected_directives_are_still_removed() {
        let text = "Try [ACTION:ADD_TO_QUOTE, SKU:../../../etc/passwd, QUANTITY:1] now";
        assert_eq!(sanitize(text), "Try now");
    }
}
