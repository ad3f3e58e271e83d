use crate::errors::{Result, TenhouError};
use crate::hand::Hand;
use crate::tile::Tile;

/// Hands out concrete 136-ids for a kind, keeping track of which of
/// the four copies are spoken for. Copy 0 of the fives is the red
/// one, so plain fives prefer copies 1..3 and fall back to the red
/// only when the black ones run out.
struct TileManager {
    used: [[bool; 4]; 34],
}

impl TileManager {
    fn new() -> Self {
        Self {
            used: [[false; 4]; 34],
        }
    }

    fn take(&mut self, kind: usize, want_red: bool) -> Result<Tile> {
        let is_five = matches!(kind, 4 | 13 | 22);
        let order: &[usize] = match (is_five, want_red) {
            (true, true) => &[0],
            (true, false) => &[1, 2, 3, 0],
            (false, _) => &[0, 1, 2, 3],
        };
        let copy = order
            .iter()
            .find(|&&c| !self.used[kind][c])
            .copied()
            .ok_or_else(|| {
                TenhouError::format("hand", format!("no copies of kind {} left", kind))
            })?;
        self.used[kind][copy] = true;
        Tile::new((kind * 4 + copy) as u32)
    }
}

/// Parses hand notation like `"123m055p789s11z"` into concrete tiles.
/// Digit 0 is the red five of its suit.
pub fn parse_tiles(text: &str) -> Result<Vec<Tile>> {
    let mut tm = TileManager::new();
    let mut tiles = Vec::new();
    let mut pending: Vec<u32> = Vec::new();
    for c in text.chars() {
        if let Some(d) = c.to_digit(10) {
            pending.push(d);
        } else if let Some(offset) = suit_offset(c) {
            for &d in &pending {
                if offset == 27 && (d == 0 || d > 7) {
                    return Err(TenhouError::format(
                        "hand",
                        format!("tile {}{} out of range", d, c),
                    ));
                }
                let (kind, red) = if d == 0 {
                    (offset + 4, true)
                } else {
                    (offset + d as usize - 1, false)
                };
                tiles.push(tm.take(kind, red)?);
            }
            pending.clear();
        } else if !c.is_whitespace() {
            return Err(TenhouError::format(
                "hand",
                format!("unexpected character `{}`", c),
            ));
        }
    }
    if !pending.is_empty() {
        return Err(TenhouError::format("hand", "digits without a suit letter"));
    }
    Ok(tiles)
}

/// Parses hand notation straight into a kind histogram.
pub fn parse_hand(text: &str) -> Result<Hand> {
    Ok(Hand::from_tiles(&parse_tiles(text)?))
}

/// Parses exactly one tile, e.g. `"5m"` or `"0p"`.
pub fn parse_tile(text: &str) -> Result<Tile> {
    let tiles = parse_tiles(text)?;
    match tiles.as_slice() {
        [t] => Ok(*t),
        _ => Err(TenhouError::format(
            "hand",
            format!("expected one tile, found {}", tiles.len()),
        )),
    }
}

fn suit_offset(c: char) -> Option<usize> {
    match c {
        'm' => Some(0),
        'p' => Some(9),
        's' => Some(18),
        'z' => Some(27),
        _ => None,
    }
}
