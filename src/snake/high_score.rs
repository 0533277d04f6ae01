use std::{
    collections::BTreeMap,
    fmt, fs, io,
    path::PathBuf,
    str::FromStr,
    sync::{Arc, Mutex},
};

use thiserror::Error;
use tracing::{debug, info};

use super::difficulty::Difficulty;

#[derive(Error, Debug)]
pub enum HighScoreError {
    #[error("Unable to access the high score record: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed high score line {line}: {content:?}")]
    Malformed { line: usize, content: String },
    #[error("Unknown difficulty {name:?} on high score line {line}")]
    UnknownDifficulty { line: usize, name: String },
    #[error("The high score record lock was poisoned")]
    Poisoned,
}

/// Best score per difficulty. Every known difficulty is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScoreTable {
    scores: BTreeMap<Difficulty, u32>,
}

impl Default for HighScoreTable {
    fn default() -> Self {
        Self {
            scores: Difficulty::ALL.into_iter().map(|d| (d, 0)).collect(),
        }
    }
}

impl HighScoreTable {
    pub fn get(&self, difficulty: Difficulty) -> u32 {
        self.scores.get(&difficulty).copied().unwrap_or_default()
    }

    /// Records `score` if it beats the stored one. Returns whether it did.
    pub fn record(&mut self, difficulty: Difficulty, score: u32) -> bool {
        let best = self.scores.entry(difficulty).or_default();
        if score > *best {
            *best = score;
            return true;
        }
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = (Difficulty, u32)> + '_ {
        self.scores.iter().map(|(d, s)| (*d, *s))
    }
}

impl fmt::Display for HighScoreTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (difficulty, score) in self.iter() {
            writeln!(f, "{}={}", difficulty, score)?;
        }
        Ok(())
    }
}

impl FromStr for HighScoreTable {
    type Err = HighScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut table = HighScoreTable::default();

        for (index, raw) in s.lines().enumerate() {
            let line = index + 1;
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }

            let malformed = || HighScoreError::Malformed {
                line,
                content: raw.to_string(),
            };

            let (name, value) = raw.split_once('=').ok_or_else(malformed)?;
            let difficulty: Difficulty =
                name.trim()
                    .parse()
                    .map_err(|_| HighScoreError::UnknownDifficulty {
                        line,
                        name: name.trim().to_string(),
                    })?;
            let score: u32 = value.trim().parse().map_err(|_| malformed())?;

            table.scores.insert(difficulty, score);
        }

        Ok(table)
    }
}

/// Backing record for the high score table.
///
/// Implementors only move raw text around; the table format lives in the
/// provided methods.
pub trait HighScoreStore {
    /// Returns `None` when no record exists yet.
    fn read(&self) -> Result<Option<String>, HighScoreError>;

    fn write(&mut self, contents: &str) -> Result<(), HighScoreError>;

    fn load(&self) -> Result<HighScoreTable, HighScoreError> {
        match self.read()? {
            None => {
                debug!("no high score record, starting from zero");
                Ok(HighScoreTable::default())
            }
            Some(contents) => contents.parse(),
        }
    }

    fn save(&mut self, table: &HighScoreTable) -> Result<(), HighScoreError> {
        self.write(&table.to_string())
    }

    fn update_if_better(
        &mut self,
        difficulty: Difficulty,
        score: u32,
    ) -> Result<HighScoreTable, HighScoreError> {
        let mut table = self.load()?;
        if table.record(difficulty, score) {
            info!("new high score for {}: {}", difficulty, score);
            self.save(&table)?;
        }
        Ok(table)
    }
}

#[derive(Debug, Clone)]
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn read(&self) -> Result<Option<String>, HighScoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, contents: &str) -> Result<(), HighScoreError> {
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

/// In-memory record. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScoreStore {
    record: Arc<Mutex<Option<String>>>,
}

impl MemoryHighScoreStore {
    pub fn with_contents(contents: &str) -> Self {
        Self {
            record: Arc::new(Mutex::new(Some(contents.to_string()))),
        }
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn read(&self) -> Result<Option<String>, HighScoreError> {
        let record = self.record.lock().map_err(|_| HighScoreError::Poisoned)?;
        Ok(record.clone())
    }

    fn write(&mut self, contents: &str) -> Result<(), HighScoreError> {
        let mut record = self.record.lock().map_err(|_| HighScoreError::Poisoned)?;
        *record = Some(contents.to_string());
        Ok(())
    }
}
