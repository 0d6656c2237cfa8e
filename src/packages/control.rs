// src/packages/control.rs

//! Debian control stanza reading and writing
//!
//! A stanza is a run of `Field: value` lines. Lines starting with a space or
//! tab continue the previous field. Stanzas in a `Packages` file are separated
//! by blank lines.

/// One parsed stanza, fields in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlParagraph {
    fields: Vec<(String, String)>,
}

impl ControlParagraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field; empty values are skipped
    pub fn add_field(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.fields.push((name.to_string(), value));
        }
    }

    /// Value of the first field with this name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a single stanza; a blank line does not end it
    pub fn parse(content: &str) -> Self {
        let mut reader = ParagraphReader::default();
        for line in content.lines() {
            reader.feed(line);
        }
        reader.finish()
    }

    /// Render as `Field: value` lines, each terminated by a newline
    pub fn to_control_string(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.fields {
            out.push_str(name);
            out.push_str(": ");
            for (i, line) in value.lines().enumerate() {
                if i > 0 {
                    out.push('\n');
                    out.push_str(continuation_line(line));
                } else {
                    out.push_str(line);
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Parse every stanza in a multi-stanza file such as `Packages`
pub fn parse_paragraphs(content: &str) -> Vec<ControlParagraph> {
    let mut paragraphs = Vec::new();
    let mut reader = ParagraphReader::default();

    for line in content.lines() {
        if line.trim().is_empty() {
            let paragraph = std::mem::take(&mut reader).finish();
            if !paragraph.is_empty() {
                paragraphs.push(paragraph);
            }
        } else {
            reader.feed(line);
        }
    }

    let paragraph = reader.finish();
    if !paragraph.is_empty() {
        paragraphs.push(paragraph);
    }

    paragraphs
}

/// A continuation line as written to a stanza
///
/// A line holding only whitespace would read as a stanza separator, so it
/// becomes the ` .` placeholder.
fn continuation_line(line: &str) -> &str {
    if line.trim().is_empty() {
        " ."
    } else {
        line
    }
}

/// Scanner state between lines
#[derive(Debug, Default)]
enum ScanState {
    #[default]
    Idle,
    Accumulating { name: String, value: String },
}

#[derive(Debug, Default)]
struct ParagraphReader {
    state: ScanState,
    paragraph: ControlParagraph,
}

impl ParagraphReader {
    fn feed(&mut self, line: &str) {
        let continuation = line.starts_with(' ') || line.starts_with('\t');

        self.state = match std::mem::take(&mut self.state) {
            ScanState::Accumulating { name, mut value } if continuation => {
                value.push('\n');
                value.push_str(continuation_line(line));
                ScanState::Accumulating { name, value }
            }
            // A continuation with no field to attach to is dropped
            ScanState::Idle if continuation => ScanState::Idle,
            previous => {
                self.commit(previous);
                match line.split_once(':') {
                    Some((name, value)) if !name.is_empty() => ScanState::Accumulating {
                        name: name.trim().to_string(),
                        value: value.trim().to_string(),
                    },
                    _ => ScanState::Idle,
                }
            }
        };
    }

    fn commit(&mut self, state: ScanState) {
        if let ScanState::Accumulating { name, value } = state {
            self.paragraph.add_field(&name, value.trim());
        }
    }

    fn finish(mut self) -> ControlParagraph {
        let state = std::mem::take(&mut self.state);
        self.commit(state);
        self.paragraph
    }
}
