//! Source-file surgery for ES modules: import injection and element
//! wrapping.
//!
//! Both primitives are line- and string-oriented on purpose. They target
//! the top of generated JavaScript/TypeScript files where import
//! declarations live on single lines and a root element like `<App>`
//! appears once; they do not parse the language. Multi-line import
//! declarations are left alone and a fresh one is added instead.

use std::fmt::Write as _;

use crate::domain::entities::action::{ImportSpec, WrapSpec};
use crate::domain::entities::common::FileState;
use crate::domain::error::DomainError;

use super::Rewrite;

// ─────────────────────────────────────────────
// Import injection
// ─────────────────────────────────────────────

/// Inject named imports, never duplicating a binding.
///
/// For each spec, the first declaration importing the same module gains the
/// name in its braces (`import React from "react"` becomes
/// `import React, { useState } from "react"`); a name already bound there,
/// as a default or in the named list (aliases count by their source name),
/// is a no-op. With no declaration to extend, a new
/// `import { name } from "module";` goes after the last import line, or at
/// the top of the file when there are none. When nothing changes the input
/// comes back byte-identical.
pub fn inject_imports(
    path: &str,
    state: &FileState,
    imports: &[ImportSpec],
) -> Result<Rewrite, DomainError> {
    let original = state.content().ok_or_else(|| DomainError::NotFound {
        path: path.to_string(),
    })?;

    let had_trailing_newline = original.ends_with('\n');
    let mut lines: Vec<String> = original.lines().map(str::to_string).collect();
    let mut changed = false;

    for spec in imports {
        changed |= apply_import(&mut lines, spec);
    }
    if !changed {
        return Ok(Rewrite::unchanged(original));
    }

    let mut next = lines.join("\n");
    if had_trailing_newline || original.is_empty() {
        next.push('\n');
    }
    Ok(Rewrite::changed(next))
}

fn apply_import(lines: &mut Vec<String>, spec: &ImportSpec) -> bool {
    let mut last_import = None;
    let mut extend_at: Option<(usize, ImportLine)> = None;

    for (idx, line) in lines.iter().enumerate() {
        let Some(parsed) = ImportLine::parse(line) else {
            continue;
        };
        last_import = Some(idx);
        if parsed.module != spec.from {
            continue;
        }
        if parsed.provides(&spec.name) {
            return false;
        }
        if parsed.extensible && extend_at.is_none() {
            extend_at = Some((idx, parsed));
        }
    }

    if let Some((idx, mut parsed)) = extend_at {
        parsed.named.push(spec.name.clone());
        lines[idx] = parsed.render();
        return true;
    }
    let at = last_import.map_or(0, |i| i + 1);
    lines.insert(at, format!("import {{ {} }} from \"{}\";", spec.name, spec.from));
    true
}

/// One single-line import declaration, decomposed enough to extend its
/// named list and print it back.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ImportLine {
    indent: String,
    default_import: Option<String>,
    named: Vec<String>,
    module: String,
    quote: char,
    semicolon: bool,
    /// Namespace (`* as ns`), side-effect, and type-only imports exist but
    /// cannot take another named binding.
    extensible: bool,
}

impl ImportLine {
    fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        let indent = line[..line.len() - trimmed.len()].to_string();
        let rest = trimmed.strip_prefix("import")?;
        if !rest.starts_with([' ', '\t', '{', '"', '\'']) {
            return None;
        }
        let semicolon = rest.trim_end().ends_with(';');
        let body = rest.trim().trim_end_matches(';').trim_end();

        let quote = body.chars().next_back().filter(|c| matches!(c, '"' | '\''))?;
        let inner = &body[..body.len() - 1];
        let open_quote = inner.rfind(quote)?;
        let module = inner[open_quote + 1..].to_string();
        let head = inner[..open_quote].trim_end();

        let mut parsed = Self {
            indent,
            default_import: None,
            named: Vec::new(),
            module,
            quote,
            semicolon,
            extensible: true,
        };

        if head.is_empty() {
            // side-effect form: `import "./styles.css";`
            parsed.extensible = false;
            return Some(parsed);
        }
        let clause = head.strip_suffix("from")?;
        if let Some(last) = clause.chars().next_back() {
            if !last.is_whitespace() && last != '}' {
                return None;
            }
        }
        let clause = clause.trim();
        if clause.is_empty() {
            return None;
        }
        if clause.starts_with('*')
            || clause == "type"
            || clause.starts_with("type ")
            || clause.starts_with("type{")
        {
            parsed.extensible = false;
            return Some(parsed);
        }

        match clause.find('{') {
            Some(brace) => {
                let close = clause.rfind('}')?;
                parsed.named = clause[brace + 1..close]
                    .split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_string)
                    .collect();
                let before = clause[..brace].trim().trim_end_matches(',').trim_end();
                if !before.is_empty() {
                    parsed.default_import = Some(before.to_string());
                }
            }
            None => parsed.default_import = Some(clause.to_string()),
        }
        Some(parsed)
    }

    /// Aliased entries (`useState as useLocal`) count by their source name.
    fn provides(&self, name: &str) -> bool {
        if self.default_import.as_deref() == Some(name) {
            return true;
        }
        self.named
            .iter()
            .any(|entry| entry.split_whitespace().next() == Some(name))
    }

    fn render(&self) -> String {
        let mut line = format!("{}import ", self.indent);
        match (&self.default_import, self.named.is_empty()) {
            (Some(default), true) => line.push_str(default),
            (Some(default), false) => {
                let _ = write!(line, "{default}, {{ {} }}", self.named.join(", "));
            }
            (None, false) => {
                let _ = write!(line, "{{ {} }}", self.named.join(", "));
            }
            (None, true) => return line.trim_end().to_string(),
        }
        let _ = write!(line, " from {}{}{}", self.quote, self.module, self.quote);
        if self.semicolon {
            line.push(';');
        }
        line
    }
}

// ─────────────────────────────────────────────
// Element wrapping
// ─────────────────────────────────────────────

/// Wrap the first occurrence of `<target ...>...</target>` (or a
/// self-closing `<target ... />`) in the wrapper element.
///
/// Attribute values already in braces are emitted as expressions
/// (`client={queryClient}`); anything else is quoted. A file without the
/// target is returned unchanged with a warning; an opening tag whose close
/// never appears is a [`DomainError::NoMatch`].
pub fn wrap_element(
    path: &str,
    state: &FileState,
    wrap: &WrapSpec,
) -> Result<Rewrite, DomainError> {
    let original = state.content().ok_or_else(|| DomainError::NotFound {
        path: path.to_string(),
    })?;

    let Some(open_start) = find_opening_tag(original, &wrap.target) else {
        return Ok(Rewrite::unchanged(original).with_warning(format!(
            "no <{}> element in {path}; wrap left the file unchanged",
            wrap.target
        )));
    };
    let (open_end, self_closing) =
        scan_tag_end(original, open_start).ok_or_else(|| DomainError::NoMatch {
            target: format!("<{}>", wrap.target),
            path: path.to_string(),
        })?;

    let closing = format!("</{}>", wrap.target);
    let span_end = if self_closing {
        open_end
    } else {
        let rel = original[open_end..]
            .find(&closing)
            .ok_or_else(|| DomainError::NoMatch {
                target: closing.clone(),
                path: path.to_string(),
            })?;
        open_end + rel + closing.len()
    };

    let mut opener = format!("<{}", wrap.wrapper);
    for (key, value) in &wrap.attributes {
        if value.starts_with('{') && value.ends_with('}') {
            let _ = write!(opener, " {key}={value}");
        } else {
            let _ = write!(opener, " {key}=\"{value}\"");
        }
    }
    opener.push('>');
    let closer = format!("</{}>", wrap.wrapper);

    let mut next = String::with_capacity(original.len() + opener.len() + closer.len());
    next.push_str(&original[..open_start]);
    next.push_str(&opener);
    next.push_str(&original[open_start..span_end]);
    next.push_str(&closer);
    next.push_str(&original[span_end..]);
    Ok(Rewrite::changed(next))
}

/// Find `<target` followed by whitespace, `>`, or `/` so that `App` never
/// matches `<AppBar`.
fn find_opening_tag(source: &str, target: &str) -> Option<usize> {
    let needle = format!("<{target}");
    let mut from = 0;
    while let Some(rel) = source[from..].find(&needle) {
        let at = from + rel;
        match source.as_bytes().get(at + needle.len()) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => return Some(at),
            Some(_) => from = at + 1,
            None => return None,
        }
    }
    None
}

/// Walk from the `<` to the `>` that ends the tag, skipping `>` inside
/// quoted strings and `{...}` expression attributes. Returns the index
/// past the `>` and whether the tag self-closes.
fn scan_tag_end(source: &str, open_start: usize) -> Option<(usize, bool)> {
    let bytes = source.as_bytes();
    let mut brace_depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut prev_meaningful = 0u8;

    for (i, &b) in bytes.iter().enumerate().skip(open_start) {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'{' => brace_depth += 1,
                b'}' => brace_depth = brace_depth.saturating_sub(1),
                b'>' if brace_depth == 0 => return Some((i + 1, prev_meaningful == b'/')),
                _ => {}
            },
        }
        if !b.is_ascii_whitespace() {
            prev_meaningful = b;
        }
    }
    None
}

// ═══════════════════════════════════════════════
//                    TESTS
// ═══════════════════════════════════════════════
