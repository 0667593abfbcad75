//! Output formatting abstraction for text vs JSON rendering
//!
//! All subcommand output flows through [`OutputWriter`] which handles format switching.
//! This keeps format-specific logic out of command handlers entirely.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Abstraction for writing CLI output in different formats.
///
/// Subcommand handlers call `writer.render(&payload)` where `payload`
/// implements both `Serialize` (for JSON) and `Render` (for text).
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// Create a new output writer with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(payload, &mut handle)?;
        handle.flush()?;
        Ok(())
    }

    /// Render a payload to an arbitrary writer.
    ///
    /// For `Text` format, delegates to `Render::render_text()`.
    /// For `Json` format, serialises via `serde_json`.
    pub fn render_to<T: Render + Serialize>(
        &self,
        payload: &T,
        w: &mut dyn Write,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => {
                payload.render_text(w)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Trait for human-readable text rendering.
///
/// Implemented by every CLI output payload alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestPayload {
        source: String,
        events: u64,
    }

    impl Render for TestPayload {
        fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
            writeln!(w, "Source: {}", self.source)?;
            writeln!(w, "Events: {}", self.events)?;
            Ok(())
        }
    }

    fn payload() -> TestPayload {
        TestPayload {
            source: "Cowrie SSH".to_owned(),
            events: 42,
        }
    }

    #[test]
    fn test_render_to_text_format() {
        let writer = OutputWriter::new(OutputFormat::Text);
        let mut buffer = Vec::new();
        writer
            .render_to(&payload(), &mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Source: Cowrie SSH"));
        assert!(output.contains("Events: 42"));
    }

    #[test]
    fn test_render_to_json_format() {
        let writer = OutputWriter::new(OutputFormat::Json);
        let mut buffer = Vec::new();
        writer
            .render_to(&payload(), &mut buffer)
            .expect("json rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.ends_with('\n'), "json output should end with newline");
        assert!(output.contains("  "), "json output should be pretty-printed");

        let parsed: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(parsed["source"].as_str(), Some("Cowrie SSH"));
        assert_eq!(parsed["events"].as_u64(), Some(42));
    }

    #[test]
    fn test_json_format_ignores_text_rendering() {
        #[derive(Serialize)]
        struct TextOnlyFails {
            value: u8,
        }

        impl Render for TextOnlyFails {
            fn render_text(&self, _w: &mut dyn Write) -> std::io::Result<()> {
                Err(std::io::Error::other("text rendering not available"))
            }
        }

        let mut buffer = Vec::new();
        OutputWriter::new(OutputFormat::Json)
            .render_to(&TextOnlyFails { value: 7 }, &mut buffer)
            .expect("json path must not call render_text");

        let err = OutputWriter::new(OutputFormat::Text)
            .render_to(&TextOnlyFails { value: 7 }, &mut Vec::new())
            .expect_err("text path should surface the io error");
        assert!(matches!(err, CliError::Io(_)));
    }

    #[test]
    fn test_render_text_unicode_content() {
        let unicode = TestPayload {
            source: "허니팟 日本語 🦀".to_owned(),
            events: 1,
        };
        let mut buffer = Vec::new();
        OutputWriter::new(OutputFormat::Text)
            .render_to(&unicode, &mut buffer)
            .expect("rendering unicode should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("허니팟"));
        assert!(output.contains("🦀"));
    }
}
