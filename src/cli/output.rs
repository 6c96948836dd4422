//! Colored terminal output for bundle creation
//!
//! Stage headers, progress lines and warnings go to stdout; errors go to
//! stderr. An output manager can instead record plain lines in memory, which
//! is how tests observe what a pipeline run reported.

use std::io::Write;
use std::sync::{Arc, Mutex};
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Lines recorded by a capturing [`OutputManager`].
#[derive(Debug, Clone, Default)]
pub struct OutputCapture {
    lines: Arc<Mutex<Vec<String>>>,
}

impl OutputCapture {
    /// Every line recorded so far, without decoration
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Whether any recorded line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    fn push(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

#[derive(Debug)]
enum Sink {
    Terminal(BufferWriter),
    Captured(OutputCapture),
}

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    sink: Sink,
    verbose: bool,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        let sink = match &self.sink {
            Sink::Terminal(_) => Sink::Terminal(BufferWriter::stdout(ColorChoice::Auto)),
            Sink::Captured(capture) => Sink::Captured(capture.clone()),
        };
        Self {
            sink,
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            sink: Sink::Terminal(BufferWriter::stdout(ColorChoice::Auto)),
            verbose,
            quiet,
        }
    }

    /// Create an output manager that records lines instead of printing them
    pub fn captured() -> (Self, OutputCapture) {
        let capture = OutputCapture::default();
        let manager = Self {
            sink: Sink::Captured(capture.clone()),
            verbose: true,
            quiet: false,
        };
        (manager, capture)
    }

    /// Write one line, optionally preceded by a colored marker.
    fn emit(&self, marker: Option<(&str, ColorSpec)>, body: &str, body_color: Option<ColorSpec>) -> std::io::Result<()> {
        let bufwtr = match &self.sink {
            Sink::Captured(capture) => {
                capture.push(body);
                return Ok(());
            }
            Sink::Terminal(bufwtr) => bufwtr,
        };

        let mut buffer = bufwtr.buffer();
        if let Some((marker, spec)) = marker {
            let _ = buffer.set_color(&spec);
            let _ = write!(&mut buffer, "{} ", marker);
            let _ = buffer.reset();
        }
        if let Some(spec) = body_color {
            let _ = buffer.set_color(&spec);
        }
        let _ = writeln!(&mut buffer, "{}", body);
        let _ = buffer.reset();
        bufwtr.print(&buffer)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Green)).set_bold(true);
        self.emit(Some(("✓", spec)), message, None)
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut marker = ColorSpec::new();
        marker.set_fg(Some(Color::Yellow)).set_bold(true);
        let mut body = ColorSpec::new();
        body.set_fg(Some(Color::Yellow));
        self.emit(Some(("⚠", marker)), message, Some(body))
    }

    /// Print an error message (always shown)
    pub fn error(&self, message: &str) {
        if let Sink::Captured(capture) = &self.sink {
            capture.push(message);
            return;
        }

        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();

        // Try colored output to stderr
        if buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true)).is_err()
            || write!(&mut buffer, "✗").is_err()
            || buffer.reset().is_err()
            || buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red))).is_err()
            || writeln!(&mut buffer, " {}", message).is_err()
            || buffer.reset().is_err()
            || bufwtr.print(&buffer).is_err()
        {
            // Stderr failed - fallback to stdout as last resort
            println!("[STDERR ERROR] ✗ {}", message);
        }
    }

    /// Print a verbose/debug message (only in verbose mode)
    pub fn verbose(&self, message: &str) -> std::io::Result<()> {
        if !self.verbose || self.quiet {
            return Ok(());
        }
        let mut marker = ColorSpec::new();
        marker.set_fg(Some(Color::Blue));
        self.emit(Some(("→", marker)), message, None)
    }

    /// Print a stage header, preceded by a blank line
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.emit(None, "", None)?;
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Cyan)).set_bold(true);
        self.emit(None, title, Some(spec))
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.emit(None, &format!("    {}", message), None)
    }

    /// Print a plain message (respects quiet mode)
    pub fn println(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.emit(None, message, None)
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_output_records_plain_lines() {
        let (output, capture) = OutputManager::captured();
        output.section("[demo] Installing dependencies...").expect("section");
        output.warn("stale template").expect("warn");
        output.indent("detail").expect("indent");
        output.error("boom");

        assert_eq!(
            capture.lines(),
            vec![
                "",
                "[demo] Installing dependencies...",
                "stale template",
                "    detail",
                "boom",
            ]
        );
        assert!(capture.contains("stale"));
    }

    #[test]
    fn test_clone_shares_capture() {
        let (output, capture) = OutputManager::captured();
        output.clone().println("from clone").expect("println");
        assert_eq!(capture.lines(), vec!["from clone"]);
    }
}
