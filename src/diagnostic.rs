use owo_colors::OwoColorize;

/// A source span representing a range of bytes in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.start == 0 && self.end == 0
    }
}

/// Style for diagnostic labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    Primary,
    Secondary,
}

/// A label pointing to a specific span in the source
#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub style: LabelStyle,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }
}

/// A complete diagnostic message. The `kind` is the heading printed before
/// the code, e.g. `syntax error[E0101]`.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: &'static str,
    pub code: Option<String>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::with_kind("syntax error", message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::with_kind("runtime error", message)
    }

    fn with_kind(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Labels with a dummy span carry no location and are dropped.
    pub fn with_label(mut self, label: Label) -> Self {
        if !label.span.is_dummy() {
            self.labels.push(label);
        }
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.notes.push(format!("help: {}", help.into()));
        self
    }
}

/// Computes the 1-based line and column of a byte offset
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn line_content(source: &str, line_num: usize) -> Option<&str> {
    source.split('\n').nth(line_num - 1).map(|l| l.trim_end_matches('\r'))
}

/// Renders diagnostics against the program text, rustc style:
///
/// ```text
/// runtime error[E0201]: undefined variable `y`
///   --> main.pseudo:2:7
///    |
///  2 | print(y)
///    |       ^ not found in this scope
///    |
/// ```
pub struct DiagnosticRenderer<'a> {
    source: &'a str,
    file_name: &'a str,
    use_color: bool,
}

impl<'a> DiagnosticRenderer<'a> {
    pub fn new(source: &'a str, file_name: &'a str, use_color: bool) -> Self {
        Self {
            source,
            file_name,
            use_color,
        }
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();

        let heading = match &diagnostic.code {
            Some(code) => format!("{}[{}]", diagnostic.kind, code),
            None => diagnostic.kind.to_string(),
        };
        output.push_str(&format!(
            "{}: {}\n",
            self.paint(&heading, Paint::Error),
            self.paint(&diagnostic.message, Paint::Bold)
        ));

        let mut lines_to_show: Vec<usize> = diagnostic
            .labels
            .iter()
            .map(|label| line_col(self.source, label.span.start).0)
            .collect();
        lines_to_show.sort_unstable();
        lines_to_show.dedup();

        if let Some(first) = diagnostic.labels.first() {
            let (line, col) = line_col(self.source, first.span.start);
            let width = lines_to_show.last().copied().unwrap_or(1).to_string().len();
            let gutter = " ".repeat(width + 1);

            output.push_str(&format!(
                "{}{} {}:{}:{}\n",
                " ".repeat(width),
                self.paint("-->", Paint::Gutter),
                self.file_name,
                line,
                col
            ));
            output.push_str(&format!("{} {}\n", gutter, self.paint("|", Paint::Gutter)));

            for &line_num in &lines_to_show {
                self.render_line(&mut output, diagnostic, line_num, width);
            }

            output.push_str(&format!("{} {}\n", gutter, self.paint("|", Paint::Gutter)));
        }

        for note in &diagnostic.notes {
            output.push_str(&format!("  {} {}\n", self.paint("=", Paint::Gutter), note));
        }

        output
    }

    fn render_line(&self, output: &mut String, diagnostic: &Diagnostic, line_num: usize, width: usize) {
        let Some(content) = line_content(self.source, line_num) else {
            return;
        };

        output.push_str(&format!(
            "{:>width$} {} {}\n",
            self.paint(&line_num.to_string(), Paint::Gutter),
            self.paint("|", Paint::Gutter),
            content,
            width = width + 1
        ));

        for label in &diagnostic.labels {
            let (start_line, start_col) = line_col(self.source, label.span.start);
            if start_line != line_num {
                continue;
            }
            let (end_line, end_col) = line_col(self.source, label.span.end);
            let length = if end_line == line_num && end_col > start_col {
                end_col - start_col
            } else {
                1
            };
            let marker = match label.style {
                LabelStyle::Primary => "^",
                LabelStyle::Secondary => "-",
            };
            let underline = format!(
                "{}{} {}",
                " ".repeat(start_col - 1),
                marker.repeat(length),
                label.message
            );
            let paint = match label.style {
                LabelStyle::Primary => Paint::Error,
                LabelStyle::Secondary => Paint::Gutter,
            };
            output.push_str(&format!(
                "{} {} {}\n",
                " ".repeat(width + 1),
                self.paint("|", Paint::Gutter),
                self.paint(underline.trim_end(), paint)
            ));
        }
    }

    fn paint(&self, text: &str, paint: Paint) -> String {
        if !self.use_color {
            return text.to_string();
        }
        match paint {
            Paint::Error => text.red().bold().to_string(),
            Paint::Gutter => text.blue().to_string(),
            Paint::Bold => text.bold().to_string(),
        }
    }
}

#[derive(Clone, Copy)]
enum Paint {
    Error,
    Gutter,
    Bold,
}

/// Render multiple diagnostics followed by an abort summary
pub fn render_diagnostics(source: &str, file_name: &str, diagnostics: &[Diagnostic], use_color: bool) -> String {
    let renderer = DiagnosticRenderer::new(source, file_name, use_color);
    let mut output = String::new();

    for diagnostic in diagnostics {
        output.push_str(&renderer.render(diagnostic));
        output.push('\n');
    }

    if !diagnostics.is_empty() {
        let count = diagnostics.len();
        output.push_str(&format!(
            "error: aborting due to {} error{}\n",
            count,
            if count == 1 { "" } else { "s" }
        ));
    }

    output
}
