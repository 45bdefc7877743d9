//! Hierarchical report output.
//!
//! [`ReportWriter`] writes an indented XML tree in a single forward pass.
//! Open elements live on an explicit stack; closing with nothing open is
//! an error rather than silently producing a malformed document.

use crate::error::{CoreError, CoreResult};
use std::borrow::Cow;
use std::io::Write;

const INDENT: &str = "    ";

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#;

/// Tag-stack XML writer.
///
/// # Example
///
/// ```
/// use logscope_core::report::ReportWriter;
///
/// let mut report = ReportWriter::new(Vec::new());
/// report.open("logFile", &[]).unwrap();
/// report.leaf("recordCount", &[], "0").unwrap();
/// report.close().unwrap();
///
/// let xml = String::from_utf8(report.finish().unwrap()).unwrap();
/// assert_eq!(xml, "<logFile>\n    <recordCount>0</recordCount>\n</logFile>\n");
/// ```
pub struct ReportWriter<W: Write> {
    out: W,
    stack: Vec<String>,
}

impl<W: Write> ReportWriter<W> {
    /// Creates a writer with nothing open.
    pub fn new(out: W) -> Self {
        Self {
            out,
            stack: Vec::new(),
        }
    }

    /// Number of open elements.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Writes the XML declaration.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn declaration(&mut self) -> CoreResult<()> {
        writeln!(self.out, "{DECLARATION}")?;
        Ok(())
    }

    /// Opens an element and pushes it on the stack.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) -> CoreResult<()> {
        self.indent()?;
        write!(self.out, "<{tag}")?;
        self.attributes(attrs)?;
        writeln!(self.out, ">")?;
        self.stack.push(tag.to_owned());
        Ok(())
    }

    /// Closes the innermost open element.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnbalancedTag`] if nothing is open, or an error
    /// if writing fails.
    pub fn close(&mut self) -> CoreResult<()> {
        let tag = self.stack.pop().ok_or(CoreError::UnbalancedTag)?;
        self.indent()?;
        writeln!(self.out, "</{tag}>")?;
        Ok(())
    }

    /// Closes open elements until `depth` remain.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn close_to(&mut self, depth: usize) -> CoreResult<()> {
        while self.stack.len() > depth {
            self.close()?;
        }
        Ok(())
    }

    /// Writes an element holding text.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn leaf(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) -> CoreResult<()> {
        self.indent()?;
        write!(self.out, "<{tag}")?;
        self.attributes(attrs)?;
        writeln!(self.out, ">{}</{tag}>", escape(text))?;
        Ok(())
    }

    /// Writes an element with no content.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn empty_tag(&mut self, tag: &str, attrs: &[(&str, &str)]) -> CoreResult<()> {
        self.indent()?;
        write!(self.out, "<{tag}")?;
        self.attributes(attrs)?;
        writeln!(self.out, "/>")?;
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnbalancedTag`] if elements are still open, or
    /// an error if flushing fails.
    pub fn finish(mut self) -> CoreResult<W> {
        if !self.stack.is_empty() {
            return Err(CoreError::UnbalancedTag);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn indent(&mut self) -> CoreResult<()> {
        for _ in 0..self.stack.len() {
            self.out.write_all(INDENT.as_bytes())?;
        }
        Ok(())
    }

    fn attributes(&mut self, attrs: &[(&str, &str)]) -> CoreResult<()> {
        for (name, value) in attrs {
            write!(self.out, " {name}=\"{}\"", escape(value))?;
        }
        Ok(())
    }
}

/// Escapes XML markup characters.
///
/// Characters XML 1.0 does not allow (most C0 controls, U+FFFE, U+FFFF)
/// are replaced with U+FFFD.
#[must_use]
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|c| needs_escape(c) || !is_xml_char(c)) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c if !is_xml_char(c) => escaped.push(char::REPLACEMENT_CHARACTER),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn needs_escape(c: char) -> bool {
    matches!(c, '&' | '<' | '>' | '"' | '\'')
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut ReportWriter<Vec<u8>>) -> CoreResult<()>) -> String {
        let mut report = ReportWriter::new(Vec::new());
        f(&mut report).unwrap();
        String::from_utf8(report.finish().unwrap()).unwrap()
    }

    #[test]
    fn nested_elements_are_indented() {
        let xml = render(|r| {
            r.declaration()?;
            r.open("a", &[])?;
            r.open("b", &[("offset", "24")])?;
            r.leaf("c", &[], "text")?;
            r.empty_tag("d", &[("value", "NULL")])?;
            r.close()?;
            r.close()
        });

        assert_eq!(
            xml,
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n",
                "<a>\n",
                "    <b offset=\"24\">\n",
                "        <c>text</c>\n",
                "        <d value=\"NULL\"/>\n",
                "    </b>\n",
                "</a>\n",
            )
        );
    }

    #[test]
    fn close_on_empty_stack_fails() {
        let mut report = ReportWriter::new(Vec::new());
        assert!(matches!(report.close(), Err(CoreError::UnbalancedTag)));

        report.open("a", &[]).unwrap();
        report.close().unwrap();
        assert!(matches!(report.close(), Err(CoreError::UnbalancedTag)));
    }

    #[test]
    fn close_to_unwinds() {
        let xml = render(|r| {
            r.open("a", &[])?;
            r.open("b", &[])?;
            r.open("c", &[])?;
            r.close_to(1)?;
            assert_eq!(r.depth(), 1);
            r.leaf("x", &[], "1")?;
            r.close_to(0)
        });
        assert_eq!(
            xml,
            "<a>\n    <b>\n        <c>\n        </c>\n    </b>\n    <x>1</x>\n</a>\n"
        );
    }

    #[test]
    fn finish_with_open_tags_fails() {
        let mut report = ReportWriter::new(Vec::new());
        report.open("a", &[]).unwrap();
        assert!(matches!(report.finish(), Err(CoreError::UnbalancedTag)));
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let xml = render(|r| {
            r.leaf("detail", &[("type", "a\"b")], "x < y && z > 'w'")
        });
        assert_eq!(
            xml,
            "<detail type=\"a&quot;b\">x &lt; y &amp;&amp; z &gt; &apos;w&apos;</detail>\n"
        );
    }

    #[test]
    fn control_characters_are_replaced() {
        let xml = render(|r| r.leaf("details", &[("type", "a\u{8}")], "row\u{0}col\u{1b}\tend"));
        assert_eq!(
            xml,
            "<details type=\"a\u{FFFD}\">row\u{FFFD}col\u{FFFD}\tend</details>\n"
        );
        assert_eq!(escape("\u{FFFE}\u{FFFF}"), "\u{FFFD}\u{FFFD}");
        assert!(matches!(escape("line\r\n"), Cow::Borrowed(_)));
    }

    #[test]
    fn escape_borrows_clean_text() {
        assert!(matches!(escape("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn write_failure_surfaces_as_io() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk full"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut report = ReportWriter::new(Broken);
        assert!(matches!(report.open("a", &[]), Err(CoreError::Io(_))));
    }
}
