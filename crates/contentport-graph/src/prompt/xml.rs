use std::fmt;

/// Line-oriented XML builder for model prompts.
///
/// Attribute values are escaped. Element content is written verbatim so
/// drafts and documents reach the model unchanged.
#[derive(Debug, Clone, Default)]
pub struct XmlPrompt {
    lines: Vec<String>,
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn attributes(attrs: &[(&str, String)]) -> String {
    attrs
        .iter()
        .map(|(name, value)| format!(" {}=\"{}\"", name, escape_attr(value)))
        .collect()
}

impl XmlPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, tag: &str, attrs: &[(&str, String)]) -> &mut Self {
        self.lines.push(format!("<{}{}>", tag, attributes(attrs)));
        self
    }

    pub fn close(&mut self, tag: &str) -> &mut Self {
        self.lines.push(format!("</{}>", tag));
        self
    }

    /// `<name attrs>content</name>` on one line
    pub fn tag(&mut self, name: &str, content: &str, attrs: &[(&str, String)]) -> &mut Self {
        self.lines
            .push(format!("<{}{}>{}</{}>", name, attributes(attrs), content, name));
        self
    }

    /// Raw line between elements
    pub fn text(&mut self, content: &str) -> &mut Self {
        self.lines.push(content.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for XmlPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}
