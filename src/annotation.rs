//! Scanner for the PGN-like annotation text attached to every archived game.
//!
//! Two things are read out of it: the number of moves played, counted from
//! the clock-annotated move markers, and the date and time the game was
//! played, read from the `Timezone` tag and the zone-prefixed date/time tags.

use chrono::{NaiveDate, NaiveTime};
use shakmaty::Color;

use crate::error::ParseErrorKind;

const CLOCK_MARKER: &str = "%clk";
const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// `N.` for White, `N...` for Black.
    MoveNumber { number: u32, color: Color },
    San(&'a str),
    Comment(&'a str),
    Result(&'a str),
}

/// Tokenizer over the movetext section (everything after the tag pairs).
pub(crate) struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(pgn: &'a str) -> Self {
        Self {
            text: movetext(pgn),
            pos: 0,
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let text = self.text;
        let bytes = text.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return None;
        }

        let start = self.pos;
        if bytes[start] == b'{' {
            let end = text[start..].find('}').map_or(bytes.len(), |i| start + i);
            self.pos = (end + 1).min(bytes.len());
            return Some(Token::Comment(&text[start + 1..end]));
        }

        let mut end = start;
        while end < bytes.len() && !bytes[end].is_ascii_whitespace() && bytes[end] != b'{' {
            end += 1;
        }
        let token = &text[start..end];

        if RESULT_TOKENS.contains(&token) {
            self.pos = end;
            return Some(Token::Result(token));
        }

        let digits = token.bytes().take_while(u8::is_ascii_digit).count();
        let dots = token[digits..].bytes().take_while(|&b| b == b'.').count();
        if digits > 0 && dots > 0 {
            if let Ok(number) = token[..digits].parse() {
                // "1.e4" carries its move in the same token
                self.pos = start + digits + dots;
                let color = if dots >= 3 { Color::Black } else { Color::White };
                return Some(Token::MoveNumber { number, color });
            }
        }

        self.pos = end;
        Some(Token::San(token))
    }
}

/// Skips the leading `[Tag "value"]` lines.
fn movetext(pgn: &str) -> &str {
    let mut offset = 0;
    for line in pgn.split_inclusive('\n') {
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('[') {
            break;
        }
        offset += line.len();
    }
    &pgn[offset..]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HalfMove {
    number: u32,
    color: Color,
    clocked: bool,
}

impl HalfMove {
    #[inline]
    fn is(&self, number: u32, color: Color) -> bool {
        self.clocked && self.number == number && self.color == color
    }
}

struct Movetext {
    half_moves: Vec<HalfMove>,
    terminated: bool,
}

fn scan_movetext(pgn: &str) -> Movetext {
    let mut half_moves: Vec<HalfMove> = Vec::with_capacity(160);
    let mut pending = None;
    let mut terminated = false;

    for token in Tokens::new(pgn) {
        match token {
            Token::MoveNumber { number, color } => pending = Some((number, color)),
            Token::San(_) => {
                let (number, color) = match pending.take() {
                    Some(marker) => marker,
                    // Black's reply without its own "N..." marker
                    None => match half_moves.last() {
                        Some(prev) if prev.color == Color::White => (prev.number, Color::Black),
                        _ => continue,
                    },
                };
                half_moves.push(HalfMove {
                    number,
                    color,
                    clocked: false,
                });
            }
            Token::Comment(text) => {
                if text.contains(CLOCK_MARKER) {
                    if let Some(last) = half_moves.last_mut() {
                        last.clocked = true;
                    }
                }
            }
            Token::Result(token) => {
                terminated = token != "*";
                break;
            }
        }
    }

    Movetext {
        half_moves,
        terminated,
    }
}

/// Counts completed turns: turn N counts while both halves of it carry a
/// clock annotation. A lone clocked White half-move that is the last move
/// before a decisive or drawn result token counts as one more turn.
pub fn count_moves(pgn: &str) -> u32 {
    let Movetext {
        half_moves,
        terminated,
    } = scan_movetext(pgn);

    let mut moves = 0;
    let mut rest = half_moves.as_slice();
    loop {
        let turn = moves + 1;
        match rest {
            [white, black, tail @ ..] if white.is(turn, Color::White) && black.is(turn, Color::Black) => {
                moves = turn;
                rest = tail;
            }
            [white] if terminated && white.is(turn, Color::White) => return turn,
            _ => return moves,
        }
    }
}

/// SAN tokens of the movetext, in order.
pub(crate) fn san_moves(pgn: &str) -> Vec<&str> {
    Tokens::new(pgn)
        .take_while(|token| !matches!(token, Token::Result(_)))
        .filter_map(|token| match token {
            Token::San(san) => Some(san),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedAt {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub timezone: String,
}

const TIMEZONE_TAG: &str = "Timezone";
const TIMEZONE_LEN: usize = 3;
const DATE_LEN: usize = 10;
const TIME_LEN: usize = 8;

/// Reads the zone abbreviation after `Timezone "`, then the fixed-width
/// values after `<zone>Date "` and `<zone>Time "`.
pub fn played_at(pgn: &str) -> Result<PlayedAt, ParseErrorKind> {
    let timezone = tag_value(pgn, TIMEZONE_TAG, TIMEZONE_LEN, ParseErrorKind::MalformedTimezone)?;
    if !timezone.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(ParseErrorKind::MalformedTimezone(timezone.to_string()));
    }

    let date = tag_value(pgn, &format!("{timezone}Date"), DATE_LEN, ParseErrorKind::MalformedDate)?;
    let date = NaiveDate::parse_from_str(date, "%Y.%m.%d")
        .map_err(|_| ParseErrorKind::MalformedDate(date.to_string()))?;

    let time = tag_value(pgn, &format!("{timezone}Time"), TIME_LEN, ParseErrorKind::MalformedTime)?;
    let time = NaiveTime::parse_from_str(time, "%H:%M:%S")
        .map_err(|_| ParseErrorKind::MalformedTime(time.to_string()))?;

    Ok(PlayedAt {
        date,
        time,
        timezone: timezone.to_string(),
    })
}

/// `len` bytes after the tag name and its `space + quote` separator.
fn tag_value<'a>(
    pgn: &'a str,
    tag: &str,
    len: usize,
    malformed: fn(String) -> ParseErrorKind,
) -> Result<&'a str, ParseErrorKind> {
    let at = pgn
        .find(tag)
        .ok_or_else(|| ParseErrorKind::MissingTag(tag.to_string()))?;
    let start = at + tag.len() + 2;
    pgn.get(start..start + len)
        .ok_or_else(|| malformed(pgn[at..].chars().take(24).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADERS: &str = "[Event \"Live Chess\"]\n\
        [Site \"Chess.com\"]\n\
        [Date \"2022.06.20\"]\n\
        [White \"alice\"]\n\
        [Black \"bob\"]\n\
        [Result \"1-0\"]\n\
        [Timezone \"UTC\"]\n\
        [UTCDate \"2022.06.20\"]\n\
        [UTCTime \"15:24:10\"]\n\
        [TimeControl \"300\"]\n\n";

    #[test]
    fn test_trailing_white_half_move_before_result_counts() {
        let pgn = "1.e4{[%clk 0:05:00]} 1...e5{[%clk 0:05:00]} 2.Nf3{[%clk 0:04:58]} 1-0";
        assert_eq!(count_moves(pgn), 2);
    }

    #[test]
    fn test_complete_turns_without_trailing_move() {
        let pgn = "1.e4{[%clk 0:05:00]} 1...e5{[%clk 0:05:00]} 2.Nf3{[%clk 0:04:58]} 2...Nc6{[%clk 0:04:57]}";
        assert_eq!(count_moves(pgn), 2);
    }

    #[test]
    fn test_complete_turns_then_result() {
        let pgn = "1. e4 {[%clk 0:05:00]} 1... e5 {[%clk 0:05:00]} 2. Qh5 {[%clk 0:04:58]} 2... Ke7 {[%clk 0:04:50]} 0-1\n";
        assert_eq!(count_moves(pgn), 2);
    }

    #[test]
    fn test_trailing_white_half_move_without_result_is_not_counted() {
        let pgn = "1.e4{[%clk 0:05:00]} 1...e5{[%clk 0:05:00]} 2.Nf3{[%clk 0:04:58]}";
        assert_eq!(count_moves(pgn), 1);
    }

    #[test]
    fn test_unterminated_marker_does_not_count_trailing_half_move() {
        let pgn = "1.e4{[%clk 0:05:00]} 1...e5{[%clk 0:05:00]} 2.Nf3{[%clk 0:04:58]} *";
        assert_eq!(count_moves(pgn), 1);
    }

    #[test]
    fn test_draw_result_counts_trailing_half_move() {
        let pgn = "1. e4 {[%clk 0:05:00]} 1... e5 {[%clk 0:05:00]} 2. Ke2 {[%clk 0:04:58]} 1/2-1/2";
        assert_eq!(count_moves(pgn), 2);
    }

    #[test]
    fn test_real_layout_with_headers() {
        let pgn = format!(
            "{HEADERS}1. e4 {{[%clk 0:04:59.9]}} 1... e5 {{[%clk 0:04:58.1]}} \
             2. Bc4 {{[%clk 0:04:57]}} 2... Nc6 {{[%clk 0:04:55.3]}} \
             3. Qh5 {{[%clk 0:04:54]}} 3... Nf6 {{[%clk 0:04:50]}} \
             4. Qxf7# {{[%clk 0:04:49.5]}} 1-0\n"
        );
        assert_eq!(count_moves(&pgn), 4);
    }

    #[test]
    fn test_missing_clock_breaks_the_count() {
        let pgn = "1. e4 {[%clk 0:05:00]} 1... e5 {[%clk 0:05:00]} 2. Nf3 2... Nc6 {[%clk 0:04:57]} 3. Bb5 {[%clk 0:04:50]} 1-0";
        assert_eq!(count_moves(pgn), 1);
    }

    #[test]
    fn test_no_clocks_counts_nothing() {
        assert_eq!(count_moves("1. e4 e5 2. Nf3 Nc6 1-0"), 0);
        assert_eq!(count_moves(""), 0);
    }

    #[test]
    fn test_game_aborted_after_first_white_move() {
        let pgn = "1. e4 {[%clk 0:05:00]} 1-0";
        assert_eq!(count_moves(pgn), 1);
    }

    #[test]
    fn test_out_of_sequence_numbers_stop_the_count() {
        let pgn = "1. e4 {[%clk 0:05:00]} 1... e5 {[%clk 0:05:00]} 3. Nf3 {[%clk 0:04:58]} 3... Nc6 {[%clk 0:04:57]} 1-0";
        assert_eq!(count_moves(pgn), 1);
    }

    #[test]
    fn test_count_is_pure() {
        let pgn = "1.e4{[%clk 0:05:00]} 1...e5{[%clk 0:05:00]} 2.Nf3{[%clk 0:04:58]} 1-0";
        assert_eq!(count_moves(pgn), count_moves(pgn));
    }

    #[test]
    fn test_tokens_split_glued_move_numbers() {
        let tokens: Vec<_> = Tokens::new("12...Kxf7{[%clk 0:01:00]} 0-1").collect();
        assert_eq!(
            tokens,
            vec![
                Token::MoveNumber {
                    number: 12,
                    color: Color::Black
                },
                Token::San("Kxf7"),
                Token::Comment("[%clk 0:01:00]"),
                Token::Result("0-1"),
            ]
        );
    }

    #[test]
    fn test_san_moves_skip_numbers_and_comments() {
        let pgn = format!("{HEADERS}1. e4 {{[%clk 0:05:00]}} 1... e5 {{[%clk 0:05:00]}} 2. Nf3 1-0");
        assert_eq!(san_moves(&pgn), vec!["e4", "e5", "Nf3"]);
    }

    #[test]
    fn test_played_at_reads_zone_tags() {
        let played = played_at(HEADERS).unwrap();

        assert_eq!(played.timezone, "UTC");
        assert_eq!(played.date, NaiveDate::from_ymd_opt(2022, 6, 20).unwrap());
        assert_eq!(played.time, NaiveTime::from_hms_opt(15, 24, 10).unwrap());
    }

    #[test]
    fn test_played_at_uses_declared_zone() {
        let pgn = "[Timezone \"EST\"]\n[UTCDate \"2022.06.20\"]\n[ESTDate \"2022.06.19\"]\n[ESTTime \"23:05:00\"]\n";
        let played = played_at(pgn).unwrap();

        assert_eq!(played.timezone, "EST");
        assert_eq!(played.date, NaiveDate::from_ymd_opt(2022, 6, 19).unwrap());
        assert_eq!(played.time, NaiveTime::from_hms_opt(23, 5, 0).unwrap());
    }

    #[test]
    fn test_missing_timezone_tag() {
        let pgn = "[UTCDate \"2022.06.20\"]\n[UTCTime \"15:24:10\"]\n";
        assert_eq!(
            played_at(pgn),
            Err(ParseErrorKind::MissingTag("Timezone".to_string()))
        );
    }

    #[test]
    fn test_missing_date_and_time_tags() {
        let no_date = "[Timezone \"UTC\"]\n[UTCTime \"15:24:10\"]\n";
        assert_eq!(
            played_at(no_date),
            Err(ParseErrorKind::MissingTag("UTCDate".to_string()))
        );

        let no_time = "[Timezone \"UTC\"]\n[UTCDate \"2022.06.20\"]\n";
        assert_eq!(
            played_at(no_time),
            Err(ParseErrorKind::MissingTag("UTCTime".to_string()))
        );
    }

    #[test]
    fn test_malformed_date_and_time_values() {
        let bad_date = "[Timezone \"UTC\"]\n[UTCDate \"2022.13.40\"]\n[UTCTime \"15:24:10\"]\n";
        assert!(matches!(
            played_at(bad_date),
            Err(ParseErrorKind::MalformedDate(_))
        ));

        let bad_time = "[Timezone \"UTC\"]\n[UTCDate \"2022.06.20\"]\n[UTCTime \"25:61:00\"]\n";
        assert!(matches!(
            played_at(bad_time),
            Err(ParseErrorKind::MalformedTime(_))
        ));
    }

    #[test]
    fn test_truncated_timezone() {
        assert!(matches!(
            played_at("[Timezone \"U"),
            Err(ParseErrorKind::MalformedTimezone(_))
        ));
    }
}
