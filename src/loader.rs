use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::env::{EnvSink, TargetEnv};
use crate::error::Error;
use crate::model::{Entry, LoadReport};
use crate::parser::entries;

const DEFAULT_PATH: &str = ".env";

/// Load `.env` from the current working directory into the process environment.
///
/// # Safety
///
/// The caller must ensure no other threads concurrently read or write the
/// process environment.
pub unsafe fn dotenv() -> Result<LoadReport, Error> {
    unsafe { from_filename(DEFAULT_PATH) }
}

/// Load a `.env` file from a specific path into the process environment.
///
/// # Safety
///
/// See [`dotenv`].
pub unsafe fn from_path(path: impl AsRef<Path>) -> Result<LoadReport, Error> {
    let mut loader = EnvLoader::new()
        .path(path)
        .target(unsafe { TargetEnv::process() });
    loader.load()
}

/// Load multiple `.env` files into the process environment, in order.
///
/// # Safety
///
/// See [`dotenv`].
pub unsafe fn from_paths<I, P>(paths: I) -> Result<LoadReport, Error>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut loader = EnvLoader::new()
        .paths(paths)
        .target(unsafe { TargetEnv::process() });
    loader.load()
}

/// Load a dotenv file by filename from the current working directory.
///
/// # Safety
///
/// See [`dotenv`].
pub unsafe fn from_filename(name: &str) -> Result<LoadReport, Error> {
    unsafe { from_path(PathBuf::from(name)) }
}

/// Stream assignments from `reader` into `sink`, applying each one as soon as
/// it is parsed. Returns the number of assignments applied.
///
/// On error, assignments applied before the failing line stay applied.
pub fn load_reader<R, S>(reader: R, sink: &mut S) -> Result<usize, Error>
where
    R: BufRead,
    S: EnvSink + ?Sized,
{
    let mut applied = 0usize;
    for entry in entries(reader) {
        let entry = entry?;
        trace!(key = %entry.key, line = entry.line, "setting variable");
        sink.set_var(&entry.key, &entry.value);
        applied += 1;
    }
    Ok(applied)
}

/// Builder-style dotenv loader.
///
/// Files are read in the order given; a key assigned by a later file
/// overwrites the value from an earlier one. Without any path the loader
/// reads `.env` from the working directory.
#[derive(Debug, Clone, Default)]
pub struct EnvLoader {
    paths: Vec<PathBuf>,
    target: TargetEnv,
}

impl EnvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.paths
            .extend(paths.into_iter().map(|path| path.as_ref().to_path_buf()));
        self
    }

    pub fn target(mut self, target: TargetEnv) -> Self {
        self.target = target;
        self
    }

    pub fn target_env(&self) -> &TargetEnv {
        &self.target
    }

    pub fn target_env_mut(&mut self) -> &mut TargetEnv {
        &mut self.target
    }

    pub fn into_target(self) -> TargetEnv {
        self.target
    }

    /// Parse every configured file without touching the target.
    pub fn parse_only(&self) -> Result<Vec<Entry>, Error> {
        let mut collected = Vec::new();
        for path in self.effective_paths() {
            for entry in open_entries(&path)? {
                collected.push(entry?);
            }
        }
        Ok(collected)
    }

    /// Apply every configured file to the target.
    ///
    /// A missing or unreadable file aborts the load; files before it stay
    /// applied.
    pub fn load(&mut self) -> Result<LoadReport, Error> {
        let mut report = LoadReport::default();
        for path in self.effective_paths() {
            let file = File::open(&path)?;
            report.files_read += 1;
            debug!(path = %path.display(), "loading env file");
            report.loaded += load_reader(BufReader::new(file), &mut self.target)?;
        }
        Ok(report)
    }

    fn effective_paths(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            vec![PathBuf::from(DEFAULT_PATH)]
        } else {
            self.paths.clone()
        }
    }
}

fn open_entries(path: &Path) -> Result<impl Iterator<Item = Result<Entry, Error>>, Error> {
    let file = File::open(path)?;
    let source = path.to_path_buf();
    Ok(entries(BufReader::new(file)).map(move |entry| {
        entry.map(|mut entry| {
            entry.source = Some(source.clone());
            entry
        })
    }))
}
