//! Comment and trailing-comma tolerance for hand-edited JSON files.
//!
//! Repository settings files are edited by people, who leave `//` and
//! `/* */` comments and trailing commas behind. [`strip`] removes those so
//! the result can be handed to `serde_json`. String literals are copied
//! verbatim, including any comment-like text inside them.

/// Remove comments and trailing commas, keeping everything else byte-for-byte.
///
/// Newlines inside comments are preserved so parse errors still report
/// the right line.
pub fn strip(input: &str) -> String {
    let without_comments = strip_comments(input);
    strip_trailing_commas(&without_comments)
}

fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    }
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Single pass: a comma is held back, together with the whitespace after it,
/// until the next significant character shows whether it closes a container.
fn strip_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut held: Option<String> = None;
    let mut in_string = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        if let Some(pending) = held.as_mut() {
            if c.is_whitespace() {
                pending.push(c);
                continue;
            }
            let pending = held.take().unwrap_or_default();
            if matches!(c, '}' | ']') {
                out.push_str(&pending[1..]);
            } else {
                out.push_str(&pending);
            }
        }

        match c {
            ',' => held = Some(String::from(",")),
            '"' => {
                in_string = true;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    if let Some(pending) = held {
        out.push_str(&pending);
    }
    out
}
