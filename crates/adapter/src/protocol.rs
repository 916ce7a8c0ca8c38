//! Protocol module - text messages exchanged with a peer
//!
//! Every message is a command word optionally followed by one space and an
//! argument. On the wire each message is one line; inside the line `\` is sent
//! as `\\` and a newline as `\n`, which lets the multi-line `SCORES` answer
//! travel as a single frame.

use std::fmt;

use thiserror::Error;

use crate::core::leaderboard::{parse_records, LeaderboardEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerMessage {
    /// `PIECE`: ask for one more piece
    RequestPiece,
    /// `PIECE <index>`: the next piece, by catalog index
    Piece(usize),
    /// `SCORE <n>`
    Score(u32),
    /// `LIVES <n>`
    Lives(i32),
    /// `DIE`: lives crossed below zero
    Die,
    /// `SCORES`: ask for the leaderboard
    RequestScores,
    /// `SCORES <records>`: one `name:score:lives` record per line
    Scores(Vec<LeaderboardEntry>),
    /// `NICK <name>`: label this connection on the leaderboard
    Nick(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Empty message")]
    Empty,
    #[error("Unknown command {0:?}")]
    UnknownCommand(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("{0} takes no argument")]
    UnexpectedArgument(&'static str),
    #[error("{command} has an invalid number {value:?}")]
    InvalidNumber {
        command: &'static str,
        value: String,
    },
    #[error("Invalid escape sequence in frame {0:?}")]
    BadEscape(String),
}

impl PeerMessage {
    /// Parse one decoded message
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let text = text.trim_end_matches('\r');
        if text.trim().is_empty() {
            return Err(ProtocolError::Empty);
        }

        let (command, arg) = match text.split_once(' ') {
            Some((command, arg)) => (command, Some(arg)),
            None => (text, None),
        };

        match command {
            "PIECE" => match arg {
                None => Ok(PeerMessage::RequestPiece),
                Some(arg) => parse_number("PIECE", arg).map(PeerMessage::Piece),
            },
            "SCORE" => parse_number("SCORE", required("SCORE", arg)?).map(PeerMessage::Score),
            "LIVES" => parse_number("LIVES", required("LIVES", arg)?).map(PeerMessage::Lives),
            "DIE" => no_argument("DIE", arg).map(|_| PeerMessage::Die),
            "SCORES" => Ok(match arg {
                None => PeerMessage::RequestScores,
                Some(records) => PeerMessage::Scores(parse_records(records)),
            }),
            "NICK" => {
                let name = required("NICK", arg)?.trim();
                if name.is_empty() {
                    return Err(ProtocolError::MissingArgument("NICK"));
                }
                Ok(PeerMessage::Nick(name.to_string()))
            }
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }

    /// Decode and parse one line read off the wire
    pub fn from_frame(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim_end_matches(['\n', '\r']);
        Self::parse(&decode_frame(line)?)
    }

    /// Encode as one line, without the trailing newline
    pub fn to_frame(&self) -> String {
        encode_frame(&self.to_string())
    }

    pub fn command(&self) -> &'static str {
        match self {
            PeerMessage::RequestPiece | PeerMessage::Piece(_) => "PIECE",
            PeerMessage::Score(_) => "SCORE",
            PeerMessage::Lives(_) => "LIVES",
            PeerMessage::Die => "DIE",
            PeerMessage::RequestScores | PeerMessage::Scores(_) => "SCORES",
            PeerMessage::Nick(_) => "NICK",
        }
    }
}

impl fmt::Display for PeerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerMessage::RequestPiece => f.write_str("PIECE"),
            PeerMessage::Piece(index) => write!(f, "PIECE {}", index),
            PeerMessage::Score(score) => write!(f, "SCORE {}", score),
            PeerMessage::Lives(lives) => write!(f, "LIVES {}", lives),
            PeerMessage::Die => f.write_str("DIE"),
            PeerMessage::RequestScores => f.write_str("SCORES"),
            PeerMessage::Scores(entries) => {
                f.write_str("SCORES ")?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    f.write_str(&entry.to_record())?;
                }
                Ok(())
            }
            PeerMessage::Nick(name) => write!(f, "NICK {}", name),
        }
    }
}

fn required<'a>(command: &'static str, arg: Option<&'a str>) -> Result<&'a str, ProtocolError> {
    arg.ok_or(ProtocolError::MissingArgument(command))
}

fn no_argument(command: &'static str, arg: Option<&str>) -> Result<(), ProtocolError> {
    match arg {
        Some(arg) if !arg.trim().is_empty() => Err(ProtocolError::UnexpectedArgument(command)),
        _ => Ok(()),
    }
}

fn parse_number<T: std::str::FromStr>(command: &'static str, arg: &str) -> Result<T, ProtocolError> {
    arg.trim()
        .parse::<T>()
        .map_err(|_| ProtocolError::InvalidNumber {
            command,
            value: arg.to_string(),
        })
}

/// Escape a message so it fits on one line
pub fn encode_frame(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

/// Reverse [`encode_frame`]
pub fn decode_frame(line: &str) -> Result<String, ProtocolError> {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            _ => return Err(ProtocolError::BadEscape(line.to_string())),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayerStatus;

    #[test]
    fn test_parse_requests() {
        assert_eq!(PeerMessage::parse("PIECE"), Ok(PeerMessage::RequestPiece));
        assert_eq!(PeerMessage::parse("SCORES"), Ok(PeerMessage::RequestScores));
        assert_eq!(PeerMessage::parse("DIE"), Ok(PeerMessage::Die));
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(PeerMessage::parse("PIECE 14"), Ok(PeerMessage::Piece(14)));
        assert_eq!(PeerMessage::parse("SCORE 1200"), Ok(PeerMessage::Score(1200)));
        assert_eq!(PeerMessage::parse("LIVES -1"), Ok(PeerMessage::Lives(-1)));
        assert_eq!(
            PeerMessage::parse("NICK ada lovelace"),
            Ok(PeerMessage::Nick("ada lovelace".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(PeerMessage::parse(""), Err(ProtocolError::Empty));
        assert!(matches!(
            PeerMessage::parse("HELLO"),
            Err(ProtocolError::UnknownCommand(_))
        ));
        assert!(matches!(
            PeerMessage::parse("PIECE seven"),
            Err(ProtocolError::InvalidNumber { command: "PIECE", .. })
        ));
        assert_eq!(
            PeerMessage::parse("SCORE"),
            Err(ProtocolError::MissingArgument("SCORE"))
        );
        assert_eq!(
            PeerMessage::parse("DIE now"),
            Err(ProtocolError::UnexpectedArgument("DIE"))
        );
    }

    #[test]
    fn test_scores_payload() {
        let msg = PeerMessage::parse("SCORES alice:300:2\nbob:40:DEAD").unwrap();
        let PeerMessage::Scores(entries) = msg else {
            panic!("expected scores");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].status, PlayerStatus::Dead("DEAD".to_string()));
    }

    #[test]
    fn test_scores_survive_framing() {
        let msg = PeerMessage::Scores(vec![
            LeaderboardEntry::new("a\\b", 10, PlayerStatus::Lives(3)),
            LeaderboardEntry::new("c", 5, PlayerStatus::Lives(0)),
        ]);
        let frame = msg.to_frame();
        assert!(!frame.contains('\n'));
        assert_eq!(frame, "SCORES a\\\\b:10:3\\nc:5:0");
        assert_eq!(PeerMessage::from_frame(&format!("{}\r\n", frame)), Ok(msg));
    }

    #[test]
    fn test_bad_escape() {
        assert!(matches!(
            decode_frame("PIECE \\x"),
            Err(ProtocolError::BadEscape(_))
        ));
        assert!(decode_frame("trailing\\").is_err());
    }
}
