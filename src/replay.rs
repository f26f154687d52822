use std::str::FromStr;

use shakmaty::{san::San, Chess, Position};

use crate::annotation;

/// Result of replaying a game's SAN moves from the standard start position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replay {
    pub plies: usize,
    /// False when a move failed to parse or was illegal.
    pub complete: bool,
}

impl Replay {
    /// Turns started, counting a trailing White move as a turn.
    #[inline]
    pub fn turns(&self) -> u32 {
        self.plies.div_ceil(2) as u32
    }
}

pub fn replay(pgn: &str) -> Replay {
    let mut pos = Chess::default();
    let mut plies = 0;

    for m in annotation::san_moves(pgn) {
        let Ok(san) = San::from_str(m) else {
            return Replay { plies, complete: false };
        };
        let Ok(mv) = san.to_move(&pos) else {
            return Replay { plies, complete: false };
        };
        match pos.play(mv) {
            Ok(next) => pos = next,
            Err(_) => return Replay { plies, complete: false },
        }
        plies += 1;
    }

    Replay {
        plies,
        complete: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_annotated_movetext() {
        let pgn = "1. e4 {[%clk 0:05:00]} 1... e5 {[%clk 0:05:00]} 2. Bc4 {[%clk 0:04:58]} \
                   2... Nc6 {[%clk 0:04:57]} 3. Qh5 {[%clk 0:04:56]} 3... Nf6 {[%clk 0:04:55]} \
                   4. Qxf7# {[%clk 0:04:54]} 1-0";
        let replay = replay(pgn);

        assert_eq!(replay, Replay { plies: 7, complete: true });
        assert_eq!(replay.turns(), 4);
    }

    #[test]
    fn test_illegal_move_stops_the_replay() {
        let replay = replay("1. e4 e5 2. Ke3 Nc6 1-0");

        assert_eq!(replay, Replay { plies: 2, complete: false });
        assert_eq!(replay.turns(), 1);
    }

    #[test]
    fn test_empty_movetext() {
        assert_eq!(replay(""), Replay { plies: 0, complete: true });
    }
}
