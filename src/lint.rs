//! Linter for codec DSL source: enforces the layout the printer produces.
//!
//! ## Rules
//!
//! - **Indentation**: Use exactly one tab per brace depth (no spaces). A line that starts with `}` sits one level out.
//! - **One field per line**: At most one field declaration starts on each line.
//! - **Closing brace alone**: A line containing `}` must not also contain anything but other `}`.
//! - **No trailing whitespace**: Lines must not have trailing spaces or tabs.
//!
//! The rules run over the scanner's tokens, so braces and colons inside string
//! literals are never miscounted. Run the linter via the `codec_lint` binary.

use crate::ast::Codec;
use crate::error::{Error, Result};
use crate::parser::{parse_with_options, ParseOptions};
use crate::printer::print_codecs;
use crate::scanner::{ScanOptions, Scanner};
use crate::token::{Span, Token, TokenKind};

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Identifies which rule produced the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintRule {
    /// Indentation must use tabs only (no spaces).
    IndentationTabsOnly,
    /// Indentation must be exactly N tabs at depth N.
    IndentationDepth,
    /// At most one field declaration per line.
    OneFieldPerLine,
    /// Closing `}` should be the only token on its line.
    ClosingBraceAlone,
    /// Trailing whitespace is not allowed.
    NoTrailingWhitespace,
}

impl LintRule {
    pub fn id(self) -> &'static str {
        match self {
            LintRule::IndentationTabsOnly => "indentation-tabs-only",
            LintRule::IndentationDepth => "indentation-depth",
            LintRule::OneFieldPerLine => "one-field-per-line",
            LintRule::ClosingBraceAlone => "closing-brace-alone",
            LintRule::NoTrailingWhitespace => "no-trailing-whitespace",
        }
    }
}

/// A single lint message with location. Line and column are 1-based.
#[derive(Debug, Clone)]
pub struct LintMessage {
    pub line: usize,
    pub column: usize,
    pub rule: LintRule,
    pub severity: Severity,
    pub message: String,
}

/// Tokens that begin on one source line.
#[derive(Debug, Default)]
struct LineTokens<'a> {
    first: Option<&'a Token>,
    /// Brace depth in effect at the start of the line.
    depth: usize,
    field_starts: usize,
    close_braces: usize,
    others: usize,
}

/// Run all lint rules on DSL source. Returns messages in line order.
pub fn lint(source: &str) -> Result<Vec<LintMessage>> {
    lint_with_options(source, ScanOptions::default())
}

pub fn lint_with_options(source: &str, options: ScanOptions) -> Result<Vec<LintMessage>> {
    let tokens = Scanner::with_options(source.as_bytes(), options).tokenize()?;
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(source.match_indices('\n').map(|(i, _)| i + 1))
        .collect();
    let line_of = |offset: usize| line_starts.partition_point(|&start| start <= offset) - 1;

    let mut lines: Vec<LineTokens<'_>> = line_starts.iter().map(|_| LineTokens::default()).collect();
    let mut depth: usize = 0;
    let mut next_line = 0;
    for (i, token) in tokens.iter().enumerate() {
        while next_line < lines.len() && line_starts[next_line] <= token.span.start {
            lines[next_line].depth = depth;
            next_line += 1;
        }
        if token.is_eof() {
            break;
        }
        let line = &mut lines[line_of(token.span.start)];
        if line.first.is_none() {
            line.first = Some(token);
        }
        match token.kind {
            TokenKind::OpenBrace => {
                depth += 1;
                line.others += 1;
            }
            TokenKind::CloseBrace => {
                depth = depth.saturating_sub(1);
                line.close_braces += 1;
            }
            _ => line.others += 1,
        }
        if starts_field(&tokens, i) {
            line.field_starts += 1;
        }
    }

    let mut out = Vec::new();
    for (i, (raw, info)) in source.split('\n').zip(&lines).enumerate() {
        let line_no = i + 1;
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        let content = text.trim_end();

        if content.len() != text.len() {
            out.push(LintMessage {
                line: line_no,
                column: content.chars().count() + 1,
                rule: LintRule::NoTrailingWhitespace,
                severity: Severity::Warning,
                message: "trailing whitespace not allowed".to_string(),
            });
        }

        let trimmed = content.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        let leading = &content[..content.len() - trimmed.len()];

        if leading.chars().any(|c| c != '\t') {
            out.push(LintMessage {
                line: line_no,
                column: 1,
                rule: LintRule::IndentationTabsOnly,
                severity: Severity::Error,
                message: "indentation must use tabs only (no spaces)".to_string(),
            });
        }

        // Continuation lines of a multi-line string keep their own indentation.
        if !inside_string(&tokens, line_starts[i]) {
            let expected = match info.first {
                Some(first) if first.is(TokenKind::CloseBrace) => info.depth.saturating_sub(1),
                _ => info.depth,
            };
            let tab_count = leading.chars().filter(|&c| c == '\t').count();
            if tab_count != expected {
                out.push(LintMessage {
                    line: line_no,
                    column: 1,
                    rule: LintRule::IndentationDepth,
                    severity: Severity::Error,
                    message: format!(
                        "expected {} tab(s) at depth {} (found {})",
                        expected, info.depth, tab_count
                    ),
                });
            }
        }

        if info.field_starts > 1 {
            out.push(LintMessage {
                line: line_no,
                column: 1,
                rule: LintRule::OneFieldPerLine,
                severity: Severity::Error,
                message: format!("one field per line (found {} fields)", info.field_starts),
            });
        }

        if info.close_braces > 0 && info.others > 0 {
            out.push(LintMessage {
                line: line_no,
                column: 1,
                rule: LintRule::ClosingBraceAlone,
                severity: Severity::Warning,
                message: "closing `}` should be the only content on its line".to_string(),
            });
        }
    }

    Ok(out)
}

fn inside_string(tokens: &[Token], offset: usize) -> bool {
    tokens
        .iter()
        .any(|t| t.is(TokenKind::String) && t.span.start < offset && offset < t.span.end)
}

/// A field name: an identifier followed by `:` or `{` that does not name a codec.
fn starts_field(tokens: &[Token], i: usize) -> bool {
    if !tokens[i].is(TokenKind::Identifier) {
        return false;
    }
    let names_codec = i > 0
        && tokens[i - 1].is(TokenKind::Keyword)
        && matches!(tokens[i - 1].lexeme.as_str(), "upstream" | "downstream");
    let opens_value = tokens
        .get(i + 1)
        .is_some_and(|t| t.is(TokenKind::Colon) || t.is(TokenKind::OpenBrace));
    opens_value && !names_codec
}

/// Rewrite DSL source in canonical form. Fails if the source does not parse
/// or contains a `#` the canonical form would drop.
pub fn lint_fix(source: &str, options: ParseOptions) -> Result<String> {
    let codecs = parse_with_options(source, options)?;
    fixed_source(source, &codecs, options.scan)
}

/// Canonical text for `codecs`, which were parsed from `source`.
///
/// The printer has no place for `#` text, so a source containing `#` outside a
/// string literal is refused with [`Error::UnfixableComment`].
pub fn fixed_source(source: &str, codecs: &[Codec], options: ScanOptions) -> Result<String> {
    let tokens = Scanner::with_options(source.as_bytes(), options).tokenize()?;
    let comment = source
        .match_indices('#')
        .map(|(offset, _)| offset)
        .find(|&offset| !inside_string(&tokens, offset));
    if let Some(offset) = comment {
        return Err(Error::UnfixableComment {
            span: Span::new(offset, offset + 1),
        });
    }
    Ok(print_codecs(codecs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(src: &str) -> Vec<LintRule> {
        lint(src).expect("lint").into_iter().map(|m| m.rule).collect()
    }

    #[test]
    fn lint_tabs_only() {
        let src = "downstream A {\n  x: u8\n}";
        assert!(rules(src).contains(&LintRule::IndentationTabsOnly));
    }

    #[test]
    fn lint_one_field_per_line() {
        let src = "upstream M {\n\tx: u8 y: u8\n}";
        assert!(rules(src).contains(&LintRule::OneFieldPerLine));
    }

    #[test]
    fn lint_closing_brace_alone() {
        let src = "upstream M {\n\tx: u8 }\n";
        assert!(rules(src).contains(&LintRule::ClosingBraceAlone));
    }

    #[test]
    fn lint_depth_of_nested_braces() {
        let src = "upstream M {\n\tc {\n\tx: u8\n\t}\n}\n";
        let msgs = lint(src).unwrap();
        let depth: Vec<_> = msgs.iter().filter(|m| m.rule == LintRule::IndentationDepth).collect();
        assert_eq!(depth.len(), 1);
        assert_eq!(depth[0].line, 3);
    }

    #[test]
    fn lint_trailing_whitespace_column() {
        let msgs = lint("upstream M { \n}\n").unwrap();
        let trailing = msgs.iter().find(|m| m.rule == LintRule::NoTrailingWhitespace).unwrap();
        assert_eq!((trailing.line, trailing.column), (1, 13));
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let src = "downstream A {\n\ttext: \"} { x: u8\"\n}\n";
        assert!(rules(src).is_empty(), "{:?}", lint(src));
    }

    #[test]
    fn lint_depth_behind_hash_marker() {
        let src = "upstream M {\n\t\t\t#x: u8\n}\n";
        let msgs = lint(src).unwrap();
        let depth: Vec<_> = msgs.iter().filter(|m| m.rule == LintRule::IndentationDepth).collect();
        assert_eq!(depth.len(), 1, "{:?}", msgs);
        assert_eq!(depth[0].line, 2);
    }

    #[test]
    fn lint_depth_of_comment_lines() {
        let options = ScanOptions {
            comments: crate::scanner::CommentStyle::Line,
        };
        let src = "upstream M {\n\t\t# note\n\tx: u8\n}\n";
        let msgs = lint_with_options(src, options).unwrap();
        let lines: Vec<_> = msgs
            .iter()
            .filter(|m| m.rule == LintRule::IndentationDepth)
            .map(|m| m.line)
            .collect();
        assert_eq!(lines, [2]);
    }

    #[test]
    fn string_continuation_lines_are_not_indented() {
        let src = "upstream M {\n\ttext: \"first\nsecond\"\n}\n";
        assert!(rules(src).is_empty(), "{:?}", lint(src));
    }

    #[test]
    fn fix_keeps_hash_inside_strings() {
        let src = "upstream M {\n\ttag: \"#1\"\n}\n";
        assert_eq!(lint_fix(src, ParseOptions::default()).unwrap(), src);
    }

    #[test]
    fn printed_source_is_clean() {
        let src = "upstream Move { coords { x: i32 y: little added u8 } name: base37 }";
        let fixed = lint_fix(src, ParseOptions::default()).unwrap();
        assert!(lint(&fixed).unwrap().is_empty(), "{}", fixed);
    }
}
