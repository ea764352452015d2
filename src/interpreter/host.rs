//! The interpreter's view of the outside world: where `print` output goes,
//! where `input` answers come from, and where files live.

use indexmap::IndexMap;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Log,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEntry {
    pub text: String,
    pub kind: OutputKind,
}

impl OutputEntry {
    pub fn log(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: OutputKind::Log }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: OutputKind::Error }
    }
}

pub trait OutputSink {
    fn emit(&mut self, entry: OutputEntry);
}

pub trait InputSource {
    fn request(&mut self, prompt: &str) -> Result<String, String>;
}

pub trait FileStore {
    fn read(&self, path: &str) -> Option<String>;
    fn write(&mut self, path: &str, contents: &str) -> Result<(), String>;
}

/// Log entries go to stdout, error entries to stderr.
#[derive(Debug, Default)]
pub struct ConsoleOutput;

impl OutputSink for ConsoleOutput {
    fn emit(&mut self, entry: OutputEntry) {
        match entry.kind {
            OutputKind::Log => {
                let mut stdout = io::stdout().lock();
                let _ = writeln!(stdout, "{}", entry.text);
                let _ = stdout.flush();
            }
            OutputKind::Error => eprintln!("{}", entry.text),
        }
    }
}

/// Collects entries in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferedOutput {
    entries: Rc<RefCell<Vec<OutputEntry>>>,
}

impl BufferedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<OutputEntry> {
        self.entries.borrow().clone()
    }

    /// Text of the log entries only, in order.
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.kind == OutputKind::Log)
            .map(|entry| entry.text.clone())
            .collect()
    }
}

impl OutputSink for BufferedOutput {
    fn emit(&mut self, entry: OutputEntry) {
        self.entries.borrow_mut().push(entry);
    }
}

/// Prints the prompt and reads one line from stdin.
#[derive(Debug, Default)]
pub struct StdinInput;

impl InputSource for StdinInput {
    fn request(&mut self, prompt: &str) -> Result<String, String> {
        print!("{}", prompt);
        io::stdout().flush().map_err(|e| e.to_string())?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line).map_err(|e| e.to_string())?;
        if read == 0 {
            return Err("input stream closed".to_string());
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }
}

/// Answers prompts from a fixed queue; running out is an error.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl InputSource for ScriptedInput {
    fn request(&mut self, prompt: &str) -> Result<String, String> {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| format!("no input available for prompt {:?}", prompt))
    }
}

/// In-memory file store. Clones share the same files.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileStore {
    files: Rc<RefCell<IndexMap<String, String>>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.files.borrow_mut().insert(path.into(), contents.into());
        self
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }
}

impl FileStore for MemoryFileStore {
    fn read(&self, path: &str) -> Option<String> {
        self.get(path)
    }

    fn write(&mut self, path: &str, contents: &str) -> Result<(), String> {
        self.files.borrow_mut().insert(path.to_string(), contents.to_string());
        Ok(())
    }
}

/// Files on disk, resolved relative to `root`.
#[derive(Debug, Clone)]
pub struct DirectoryFileStore {
    root: PathBuf,
}

impl DirectoryFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl FileStore for DirectoryFileStore {
    fn read(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(self.resolve(path)).ok()
    }

    fn write(&mut self, path: &str, contents: &str) -> Result<(), String> {
        std::fs::write(self.resolve(path), contents).map_err(|e| format!("cannot write {}: {}", path, e))
    }
}

/// Everything a running program can touch outside its own scopes.
pub struct Host {
    pub output: Box<dyn OutputSink>,
    pub input: Box<dyn InputSource>,
    pub files: Box<dyn FileStore>,
    pub rng: StdRng,
}

impl Host {
    pub fn new(output: impl OutputSink + 'static, input: impl InputSource + 'static, files: impl FileStore + 'static) -> Self {
        Self {
            output: Box::new(output),
            input: Box::new(input),
            files: Box::new(files),
            rng: StdRng::from_entropy(),
        }
    }

    /// Stdout/stderr, stdin and files under `root`.
    pub fn console(root: impl Into<PathBuf>) -> Self {
        Self::new(ConsoleOutput, StdinInput, DirectoryFileStore::new(root))
    }

    /// Buffered output, no input and an empty in-memory file store. The
    /// returned handle reads what the program printed.
    pub fn buffered() -> (Self, BufferedOutput) {
        let output = BufferedOutput::new();
        let host = Self::new(output.clone(), ScriptedInput::default(), MemoryFileStore::new());
        (host, output)
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn log(&mut self, text: impl Into<String>) {
        self.output.emit(OutputEntry::log(text));
    }
}
