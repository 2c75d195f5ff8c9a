//! Template micro-interpreter for action string fields.
//!
//! The grammar is deliberately tiny and non-Turing-complete:
//!
//! - `{{ path.to.value }}` — interpolate a context value. Strings render
//!   bare; numbers and booleans render as JSON text.
//! - `{{#if expr}} … {{/if}}` — include the body when the condition holds.
//!   Blocks nest; conditions use the grammar in [`condition`].
//!
//! No loops, no `{{else}}`, no function calls. Substitution always
//! terminates and has no side effects.
//!
//! ## Unknowns stay verbatim
//!
//! A placeholder whose path is not in the context — or whose inner text is
//! not a path at all — is copied through unchanged. Generated files often
//! carry `{{…}}` syntax for *their* tooling (Handlebars templates, GitHub
//! Actions expressions), and eating those would corrupt the output. Block
//! tags are stricter: an unterminated `{{#if}}` or a stray `{{/if}}` is a
//! [`DomainError::TemplateSyntax`] error, because a half-emitted block is
//! never intentional.
//!
//! [`condition`]: crate::domain::condition

use crate::domain::condition;
use crate::domain::context::ExecutionContext;
use crate::domain::error::DomainError;

/// Render a template string against the context.
pub fn render(source: &str, ctx: &ExecutionContext) -> Result<String, DomainError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];

        let if_body = after
            .strip_prefix("#if")
            .filter(|r| r.starts_with(' ') || r.starts_with('\t'));

        if let Some(tag_rest) = if_body {
            let close = tag_rest
                .find("}}")
                .ok_or_else(|| syntax("unterminated '{{#if' tag"))?;
            let expr = tag_rest[..close].trim();
            if expr.is_empty() {
                return Err(syntax("'{{#if}}' with empty condition"));
            }
            let (body, after_block) = split_if_block(&tag_rest[close + 2..])?;
            if condition::evaluate(expr, ctx)? {
                out.push_str(&render(body, ctx)?);
            }
            rest = after_block;
        } else if after.starts_with("/if}}") {
            return Err(syntax("'{{/if}}' without matching '{{#if}}'"));
        } else if let Some(close) = after.find("}}") {
            let inner = after[..close].trim();
            match lookup(inner, ctx) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&rest[open..open + close + 4]),
            }
            rest = &after[close + 2..];
        } else {
            // A lone "{{" with no closing braces is plain text.
            out.push_str(&rest[open..]);
            rest = "";
        }
    }

    out.push_str(rest);
    Ok(out)
}

fn syntax(reason: &str) -> DomainError {
    DomainError::TemplateSyntax {
        reason: reason.to_owned(),
    }
}

/// Resolve an interpolation placeholder, or `None` to leave it verbatim.
fn lookup(inner: &str, ctx: &ExecutionContext) -> Option<String> {
    if inner.is_empty() || !is_path(inner) {
        return None;
    }
    ctx.text(inner)
}

/// Interpolation paths: dotted identifiers, dashes allowed inside segments
/// (`deps.react-router-dom.version`).
fn is_path(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Split `input` at the `{{/if}}` matching an already-open block, honoring
/// nested `{{#if` openers. Returns (body, remainder-after-close).
fn split_if_block(input: &str) -> Result<(&str, &str), DomainError> {
    const OPEN: &str = "{{#if";
    const CLOSE: &str = "{{/if}}";

    let mut depth = 1usize;
    let mut offset = 0usize;
    loop {
        let next_open = input[offset..].find(OPEN);
        let next_close = input[offset..].find(CLOSE);
        match (next_open, next_close) {
            (_, None) => return Err(syntax("unterminated '{{#if}}' block")),
            (Some(o), Some(c)) if o < c => {
                depth += 1;
                offset += o + OPEN.len();
            }
            (_, Some(c)) => {
                depth -= 1;
                if depth == 0 {
                    let end = offset + c;
                    return Ok((&input[..end], &input[end + CLOSE.len()..]));
                }
                offset += c + CLOSE.len();
            }
        }
    }
}
