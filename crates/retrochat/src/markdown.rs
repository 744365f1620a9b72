//! A line-based renderer for the lightweight markdown the agent
//! replies with.

use std::sync::LazyLock;

use owo_colors::OwoColorize;
use regex::{Captures, Regex};

static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static EM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`(.+?)`").unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// Renders a streamed reply into ANSI-styled terminal lines.
///
/// The renderer is fed chunk by chunk and emits complete lines only,
/// so a styled span or a fenced code block split across two chunks
/// still renders as one unit. Call [`LineRenderer::finish`] at stream
/// end to flush the unterminated tail.
#[derive(Default)]
pub struct LineRenderer {
    buf: String,
    in_code_block: bool,
}

impl LineRenderer {
    /// Creates an empty renderer.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns the lines it completed.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.buf.push_str(chunk);
        let mut lines = Vec::new();
        while let Some(idx) = self.buf.find('\n') {
            let rest = self.buf.split_off(idx + 1);
            let mut line = std::mem::replace(&mut self.buf, rest);
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            if let Some(rendered) = self.render_line(&line) {
                lines.push(rendered);
            }
        }
        lines
    }

    /// Flushes the unterminated last line, if any.
    pub fn finish(mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buf);
        self.render_line(&line)
    }

    fn render_line(&mut self, line: &str) -> Option<String> {
        // Fence lines toggle the block and render nothing themselves.
        if line.trim_start().starts_with("```") {
            self.in_code_block = !self.in_code_block;
            return None;
        }
        if self.in_code_block {
            return Some(format!("  {}", line.dimmed()));
        }
        if let Some(text) = line.strip_prefix("# ") {
            return Some(text.bold().underline().to_string());
        }
        if let Some(text) = line.strip_prefix("## ") {
            return Some(text.bold().to_string());
        }
        Some(render_inline(line))
    }
}

fn render_inline(line: &str) -> String {
    // Bold first, so the emphasis pattern never eats a `**` pair.
    let line = BOLD_RE.replace_all(line, |caps: &Captures<'_>| {
        (&caps[1]).bold().to_string()
    });
    let line = EM_RE.replace_all(&line, |caps: &Captures<'_>| {
        (&caps[1]).italic().to_string()
    });
    let line = CODE_RE.replace_all(&line, |caps: &Captures<'_>| {
        (&caps[1]).on_bright_black().to_string()
    });
    let line = LINK_RE.replace_all(&line, |caps: &Captures<'_>| {
        format!("{} ({})", (&caps[1]).underline().blue(), (&caps[2]).dimmed())
    });
    line.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOLD: &str = "\u{1b}[1m";
    const ITALIC: &str = "\u{1b}[3m";
    const DIM: &str = "\u{1b}[2m";

    #[test]
    fn test_plain_text_passes_through() {
        let mut renderer = LineRenderer::new();
        assert_eq!(renderer.push("just words\n"), ["just words"]);
    }

    #[test]
    fn test_inline_styles() {
        let mut renderer = LineRenderer::new();
        let lines = renderer.push("some **bold** and *soft* words\n");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains(BOLD));
        assert!(lines[0].contains("bold"));
        assert!(lines[0].contains(ITALIC));
        assert!(!lines[0].contains('*'));
    }

    #[test]
    fn test_link_keeps_target_visible() {
        let mut renderer = LineRenderer::new();
        let lines = renderer.push("see [the site](https://example.com)\n");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("the site"));
        assert!(lines[0].contains("https://example.com"));
    }

    #[test]
    fn test_span_split_across_chunks() {
        let mut renderer = LineRenderer::new();
        assert!(renderer.push("**bo").is_empty());
        let lines = renderer.push("ld** done\n");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains(BOLD));
        assert!(lines[0].contains("bold"));
    }

    #[test]
    fn test_fenced_code_block() {
        let mut renderer = LineRenderer::new();
        let mut lines = Vec::new();
        lines.extend(renderer.push("```\nlet x"));
        lines.extend(renderer.push(" = 1;\n```\nafter\n"));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(DIM));
        assert!(lines[0].contains("let x = 1;"));
        assert_eq!(lines[1], "after");
    }

    #[test]
    fn test_headers() {
        let mut renderer = LineRenderer::new();
        let lines = renderer.push("# Title\n## Sub\n");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(BOLD));
        assert!(lines[0].contains("Title"));
        assert!(!lines[0].contains('#'));
        assert!(lines[1].contains("Sub"));
    }

    #[test]
    fn test_finish_flushes_trailing_line() {
        let mut renderer = LineRenderer::new();
        assert!(renderer.push("no newline at end").is_empty());
        assert_eq!(renderer.finish().unwrap(), "no newline at end");

        let renderer = LineRenderer::new();
        assert_eq!(renderer.finish(), None);
    }
}
