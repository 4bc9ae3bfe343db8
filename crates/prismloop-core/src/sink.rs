use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Where a materialized artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    File(PathBuf),
    Memory { name: String },
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::File(path) => write!(f, "{}", path.display()),
            Destination::Memory { name } => write!(f, "memory:{name}"),
        }
    }
}

/// Receives rendered artifacts.
pub trait ArtifactSink {
    fn write(&mut self, name: &str, contents: &str) -> io::Result<Destination>;
}

/// Writes artifacts as files under one directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for FileSink {
    fn write(&mut self, name: &str, contents: &str) -> io::Result<Destination> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        std::fs::write(&path, contents)?;
        Ok(Destination::File(path))
    }
}

/// Keeps artifacts in memory and counts write calls.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    artifacts: Vec<(String, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Contents of the most recent artifact written under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.artifacts
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, contents)| contents.as_str())
    }

    pub fn artifacts(&self) -> &[(String, String)] {
        &self.artifacts
    }
}

impl ArtifactSink for MemorySink {
    fn write(&mut self, name: &str, contents: &str) -> io::Result<Destination> {
        self.artifacts.push((name.to_string(), contents.to_string()));
        Ok(Destination::Memory {
            name: name.to_string(),
        })
    }
}
