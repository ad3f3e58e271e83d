use serde::Serialize;

use crate::errors::{Result, TenhouError};

pub const TILE_KINDS: usize = 34;
/// Width of the discard feature vector: 34 kinds plus one extra slot
/// per red five (inserted right after 5m, 5p, 5s).
pub const TILE_CHANNELS: usize = 37;

/// One physical tile in the 136-id scheme.
///
/// `id / 4` is the kind (0-8 man, 9-17 pin, 18-26 sou, 27-30 winds,
/// 31-33 dragons), `id % 4` the copy. Copy 0 of the fives (ids 16,
/// 52, 88) is the red five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Tile(u8);

impl Tile {
    pub fn new(id: u32) -> Result<Tile> {
        if id >= 136 {
            return Err(TenhouError::Decode {
                context: "tile id",
                value: id,
            });
        }
        Ok(Tile(id as u8))
    }

    #[inline]
    pub fn id(&self) -> u8 {
        self.0
    }

    #[inline]
    pub fn kind(&self) -> u8 {
        self.0 >> 2
    }

    #[inline]
    pub fn copy(&self) -> u8 {
        self.0 & 3
    }

    #[inline]
    pub fn is_red_five(&self) -> bool {
        matches!(self.0, 16 | 52 | 88)
    }

    pub fn is_terminal_or_honor(&self) -> bool {
        is_yaochuu_kind(self.kind())
    }

    /// Index into the 37-channel feature layout. Reds occupy their own
    /// slot directly after the ordinary five of their suit.
    pub fn channel(&self) -> usize {
        let k = self.kind() as usize;
        let mut idx = k;
        if self.is_red_five() {
            idx += 1;
        }
        if k > 4 {
            idx += 1;
        }
        if k > 13 {
            idx += 1;
        }
        if k > 22 {
            idx += 1;
        }
        idx
    }
}

impl PartialOrd for Tile {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tile {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Kind-major so sorted hands group identical kinds together.
        (self.kind(), self.0).cmp(&(other.kind(), other.0))
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let k = self.kind();
        if k < 27 {
            let suit = ['m', 'p', 's'][(k / 9) as usize];
            let num = if self.is_red_five() { 0 } else { k % 9 + 1 };
            write!(f, "{}{}", num, suit)
        } else {
            write!(f, "{}z", k - 27 + 1)
        }
    }
}

#[inline]
pub fn is_yaochuu_kind(kind: u8) -> bool {
    kind >= 27 || kind % 9 == 0 || kind % 9 == 8
}

pub const YAOCHUU_KINDS: [u8; 13] = [0, 8, 9, 17, 18, 26, 27, 28, 29, 30, 31, 32, 33];
