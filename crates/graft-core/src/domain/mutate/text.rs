//! Line-oriented text primitives: create, append, prepend, env-var upsert.
//!
//! Appends and prepends are idempotent: a block that already appears in the
//! file (matched on whole lines, not substrings) is left alone. Env-var
//! writes dedup on the key, replacing the value in place.

use crate::domain::entities::common::FileState;
use crate::domain::error::DomainError;
use crate::domain::value_objects::AppendFallback;

use super::Rewrite;

// ─────────────────────────────────────────────
// Create
// ─────────────────────────────────────────────

/// Produce a new file body, refusing to clobber an existing one unless
/// `overwrite` is set.
pub fn create(
    path: &str,
    state: &FileState,
    content: &str,
    overwrite: bool,
) -> Result<Rewrite, DomainError> {
    if state.is_present() && !overwrite {
        return Err(DomainError::AlreadyExists {
            path: path.to_string(),
        });
    }
    Ok(Rewrite::changed(content))
}

// ─────────────────────────────────────────────
// Append / prepend
// ─────────────────────────────────────────────

/// Append `block` to the end of the file, separated by a newline.
///
/// No-op (byte-identical) when the block already appears in the file.
/// A missing file is an error under [`AppendFallback::Error`] and an
/// empty starting point under [`AppendFallback::Create`].
pub fn append(
    path: &str,
    state: &FileState,
    block: &str,
    fallback: AppendFallback,
) -> Result<Rewrite, DomainError> {
    let current = existing_or_fallback(path, state, fallback)?;
    if block_present(current, block) {
        return Ok(Rewrite::unchanged(current));
    }
    let mut next = current.to_string();
    if !next.is_empty() && !next.ends_with('\n') {
        next.push('\n');
    }
    next.push_str(block);
    if !next.ends_with('\n') {
        next.push('\n');
    }
    Ok(Rewrite::changed(next))
}

/// Prepend `block` to the start of the file.
///
/// Like [`append`], a block already present anywhere in the file (not just
/// at the top) makes this a no-op.
pub fn prepend(
    path: &str,
    state: &FileState,
    block: &str,
    fallback: AppendFallback,
) -> Result<Rewrite, DomainError> {
    let current = existing_or_fallback(path, state, fallback)?;
    if block_present(current, block) {
        return Ok(Rewrite::unchanged(current));
    }
    let mut next = block.to_string();
    if !next.ends_with('\n') {
        next.push('\n');
    }
    next.push_str(current);
    Ok(Rewrite::changed(next))
}

fn existing_or_fallback<'a>(
    path: &str,
    state: &'a FileState,
    fallback: AppendFallback,
) -> Result<&'a str, DomainError> {
    match state.content() {
        Some(content) => Ok(content),
        None => match fallback {
            AppendFallback::Error => Err(DomainError::NotFound {
                path: path.to_string(),
            }),
            AppendFallback::Create => Ok(""),
        },
    }
}

/// Whole-line window match. Substring checks would treat `FOO=12` as
/// containing `FOO=1`; matching on line boundaries avoids that.
fn block_present(content: &str, block: &str) -> bool {
    let needle: Vec<&str> = block.trim_end_matches('\n').lines().collect();
    if needle.is_empty() {
        return true;
    }
    let hay: Vec<&str> = content.lines().collect();
    hay.windows(needle.len()).any(|w| w == needle.as_slice())
}

// ─────────────────────────────────────────────
// Env-var upsert
// ─────────────────────────────────────────────

/// Upsert a `KEY=value` line into a dotenv-style file.
///
/// An existing line for the key is replaced in place (the file keeps its
/// shape); duplicate lines for the same key are collapsed to one. The file
/// is created when absent.
pub fn append_env_var(
    _path: &str,
    state: &FileState,
    key: &str,
    value: &str,
) -> Result<Rewrite, DomainError> {
    let current = state.content_or_empty();
    let wanted = format!("{key}={value}");

    let mut lines: Vec<&str> = current.lines().collect();
    let mut matches = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| env_key(line) == Some(key))
        .map(|(i, _)| i);

    match matches.next() {
        Some(first) => {
            let duplicates: Vec<usize> = matches.collect();
            if lines[first] == wanted && duplicates.is_empty() {
                return Ok(Rewrite::unchanged(current));
            }
            lines[first] = &wanted;
            for idx in duplicates.into_iter().rev() {
                lines.remove(idx);
            }
        }
        None => lines.push(&wanted),
    }

    let mut next = lines.join("\n");
    next.push('\n');
    Ok(Rewrite::changed(next))
}

/// The key of a `KEY=value` line, ignoring comments and blank lines.
fn env_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let (key, _) = trimmed.split_once('=')?;
    let key = key.trim_end();
    (!key.is_empty()).then_some(key)
}

// ═══════════════════════════════════════════════
//                    TESTS
// ═══════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn present(content: &str) -> FileState {
        FileState::Present(content.to_string())
    }

    // ── create ──

    #[test]
    fn create_writes_into_absent_file() {
        let rewrite = create("a.txt", &FileState::Absent, "hello\n", false).unwrap();
        assert!(rewrite.changed);
        assert_eq!(rewrite.content, "hello\n");
    }

    #[test]
    fn create_refuses_existing_file() {
        let err = create("a.txt", &present("old"), "new", false).unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists { .. }));
    }

    #[test]
    fn create_overwrite_replaces_existing_file() {
        let rewrite = create("a.txt", &present("old"), "new", true).unwrap();
        assert!(rewrite.changed);
        assert_eq!(rewrite.content, "new");
    }

    // ── append ──

    #[test]
    fn append_adds_block_with_newline_separation() {
        let rewrite = append("a.txt", &present("line1"), "line2", AppendFallback::Error).unwrap();
        assert_eq!(rewrite.content, "line1\nline2\n");
        assert!(rewrite.changed);
    }

    #[test]
    fn append_is_idempotent() {
        let first = append("a.txt", &present("base\n"), "block", AppendFallback::Error).unwrap();
        let again = append(
            "a.txt",
            &present(&first.content),
            "block",
            AppendFallback::Error,
        )
        .unwrap();
        assert!(!again.changed);
        assert_eq!(again.content, first.content);
    }

    #[test]
    fn append_multi_line_block_detected_as_present() {
        let existing = "one\ntwo\nthree\n";
        let rewrite = append("a.txt", &present(existing), "two\nthree", AppendFallback::Error)
            .unwrap();
        assert!(!rewrite.changed);
    }

    #[test]
    fn append_does_not_false_positive_on_substrings() {
        let rewrite = append("a.txt", &present("FOO=12\n"), "FOO=1", AppendFallback::Error).unwrap();
        assert!(rewrite.changed);
        assert_eq!(rewrite.content, "FOO=12\nFOO=1\n");
    }

    #[test]
    fn append_missing_file_errors_by_default() {
        let err = append("a.txt", &FileState::Absent, "x", AppendFallback::Error).unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn append_missing_file_with_create_fallback() {
        let rewrite = append("a.txt", &FileState::Absent, "x", AppendFallback::Create).unwrap();
        assert_eq!(rewrite.content, "x\n");
    }

    // ── prepend ──

    #[test]
    fn prepend_puts_block_first() {
        let rewrite = prepend("a.txt", &present("body\n"), "header", AppendFallback::Error).unwrap();
        assert_eq!(rewrite.content, "header\nbody\n");
    }

    #[test]
    fn prepend_skips_block_present_anywhere() {
        let rewrite = prepend(
            "a.txt",
            &present("body\nheader\n"),
            "header",
            AppendFallback::Error,
        )
        .unwrap();
        assert!(!rewrite.changed);
    }

    // ── env upsert ──

    #[test]
    fn env_var_appended_to_existing_file() {
        let rewrite = append_env_var(".env", &present("A=1\n"), "B", "2").unwrap();
        assert_eq!(rewrite.content, "A=1\nB=2\n");
    }

    #[test]
    fn env_var_created_when_file_absent() {
        let rewrite = append_env_var(".env", &FileState::Absent, "A", "1").unwrap();
        assert_eq!(rewrite.content, "A=1\n");
    }

    #[test]
    fn env_var_replaces_value_in_place() {
        let state = present("A=1\nB=2\nC=3\n");
        let rewrite = append_env_var(".env", &state, "B", "changed").unwrap();
        assert_eq!(rewrite.content, "A=1\nB=changed\nC=3\n");
    }

    #[test]
    fn env_var_same_value_is_noop() {
        let rewrite = append_env_var(".env", &present("A=1\n"), "A", "1").unwrap();
        assert!(!rewrite.changed);
    }

    #[test]
    fn env_var_collapses_duplicate_keys() {
        let state = present("A=1\nB=2\nA=3\n");
        let rewrite = append_env_var(".env", &state, "A", "9").unwrap();
        assert_eq!(rewrite.content, "A=9\nB=2\n");
    }

    #[test]
    fn env_var_ignores_comments_and_blanks() {
        let state = present("# A=ignored\n\nA=1\n");
        let rewrite = append_env_var(".env", &state, "A", "2").unwrap();
        assert_eq!(rewrite.content, "# A=ignored\n\nA=2\n");
    }
}
