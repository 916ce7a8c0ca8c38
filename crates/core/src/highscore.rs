//! Persisted local scores: a text file of `name:score` lines.
//!
//! The engine only reads the file once per session to learn the high score;
//! writing the list back is up to whoever shows the score screen.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::error::ScoreFileError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Parse the score file contents. Blank lines are skipped.
pub fn parse_scores(text: &str) -> Result<Vec<ScoreEntry>, ScoreFileError> {
    let mut entries = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let malformed = || ScoreFileError::Malformed {
            line: i + 1,
            text: line.to_string(),
        };
        let (name, score) = line.rsplit_once(':').ok_or_else(malformed)?;
        let score = score.trim().parse::<u32>().map_err(|_| malformed())?;
        entries.push(ScoreEntry::new(name, score));
    }
    Ok(entries)
}

/// Load all entries from disk
pub fn load_scores(path: &Path) -> Result<Vec<ScoreEntry>, ScoreFileError> {
    let text = fs::read_to_string(path).map_err(|source| ScoreFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_scores(&text)
}

/// Highest score in the file, 0 if there is none or it cannot be read
pub fn high_score_from(path: &Path) -> u32 {
    match load_scores(path) {
        Ok(entries) => entries.iter().map(|e| e.score).max().unwrap_or(0),
        Err(ScoreFileError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
            log::info!("No score file at {}, starting from 0", path.display());
            0
        }
        Err(err @ ScoreFileError::Malformed { .. }) => {
            log::warn!("Ignoring high score: {}", err);
            0
        }
        Err(err) => {
            log::error!("An error occurred reading the high score: {}", err);
            0
        }
    }
}

/// Insert keeping the list sorted highest first, trimmed to `limit` entries
pub fn insert_score(entries: &mut Vec<ScoreEntry>, entry: ScoreEntry, limit: usize) {
    let pos = entries
        .iter()
        .position(|e| e.score < entry.score)
        .unwrap_or(entries.len());
    entries.insert(pos, entry);
    entries.truncate(limit);
}

/// Write entries sorted highest first. Creates the parent directory if needed.
pub fn save_scores(path: &Path, entries: &[ScoreEntry]) -> Result<(), ScoreFileError> {
    let io_err = |source| ScoreFileError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.score.cmp(&a.score));

    let mut f = fs::File::create(path).map_err(io_err)?;
    for entry in &sorted {
        writeln!(f, "{}:{}", entry.name, entry.score).map_err(io_err)?;
    }
    Ok(())
}
