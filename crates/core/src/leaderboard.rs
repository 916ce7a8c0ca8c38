//! Multiplayer leaderboard model
//!
//! The peer answers every `SCORES` poll with the full table, one
//! `name:score:lives` record per line. The board is replaced wholesale on each
//! answer and kept sorted by score, highest first.

use serde::{Serialize, Serializer};

use crate::types::PlayerStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    #[serde(rename = "lives", serialize_with = "serialize_status")]
    pub status: PlayerStatus,
}

fn serialize_status<S: Serializer>(status: &PlayerStatus, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(status)
}

impl LeaderboardEntry {
    pub fn new(name: impl Into<String>, score: u32, status: PlayerStatus) -> Self {
        Self {
            name: name.into(),
            score,
            status,
        }
    }

    /// Parse one `name:score:lives` record.
    ///
    /// The name may itself contain `:`; score and lives are the last two fields.
    pub fn parse(record: &str) -> Option<Self> {
        let mut fields = record.trim().rsplitn(3, ':');
        let lives = fields.next()?;
        let score = fields.next()?.trim().parse::<u32>().ok()?;
        let name = fields.next()?;
        Some(Self::new(name, score, PlayerStatus::parse(lives)))
    }

    /// Wire form, `name:score:lives`
    pub fn to_record(&self) -> String {
        format!("{}:{}:{}", self.name, self.score, self.status)
    }
}

/// Parse a newline-separated record list, dropping malformed records
pub fn parse_records(payload: &str) -> Vec<LeaderboardEntry> {
    payload
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let entry = LeaderboardEntry::parse(line);
            if entry.is_none() {
                log::warn!("Dropping malformed leaderboard record {:?}", line);
            }
            entry
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole table and sort it, highest score first.
    ///
    /// Ties keep the peer's order.
    pub fn replace(&mut self, mut entries: Vec<LeaderboardEntry>) {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries = entries;
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn snapshot(&self) -> Vec<LeaderboardEntry> {
        self.entries.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record() {
        let entry = LeaderboardEntry::parse("alice:1200:2").unwrap();
        assert_eq!(entry.name, "alice");
        assert_eq!(entry.score, 1200);
        assert_eq!(entry.status, PlayerStatus::Lives(2));

        let entry = LeaderboardEntry::parse("bob:40:DEAD").unwrap();
        assert!(entry.status.is_dead());
        assert_eq!(entry.to_record(), "bob:40:DEAD");
    }

    #[test]
    fn test_name_with_colon() {
        let entry = LeaderboardEntry::parse("a:b:10:3").unwrap();
        assert_eq!(entry.name, "a:b");
        assert_eq!(entry.score, 10);
    }

    #[test]
    fn test_malformed_records_dropped() {
        let records = parse_records("alice:10:3\nnonsense\ncarol:x:1\n\ndave:5:0");
        let names: Vec<_> = records.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["alice", "dave"]);
    }

    #[test]
    fn test_replace_sorts_descending() {
        let mut board = Leaderboard::new();
        board.replace(parse_records("a:10:3\nb:300:1\nc:20:DEAD"));
        let scores: Vec<_> = board.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, [300, 20, 10]);

        board.replace(parse_records("z:1:1"));
        assert_eq!(board.entries().len(), 1);
    }

    #[test]
    fn test_serializes_lives_as_text() {
        let entry = LeaderboardEntry::new("eve", 5, PlayerStatus::Lives(1));
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"name":"eve","score":5,"lives":"1"}"#);
    }
}
