use serde::Serialize;

use crate::errors::{Result, TenhouError};
use crate::tile::Tile;

/// A call decoded from the packed `m` attribute of an `N` record.
///
/// `from` is the relative seat offset of the tile's source: 0 = self,
/// 1 = right, 2 = across, 3 = left. `called` points at the claimed
/// tile within `tiles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call_type", rename_all = "snake_case")]
pub enum Meld {
    Chi {
        from: u8,
        tiles: [Tile; 3],
        called: u8,
    },
    Pon {
        from: u8,
        tiles: [Tile; 3],
        called: u8,
    },
    /// Added kan: a fourth tile laid on an existing pon. `tiles[3]` is
    /// the added tile.
    Shouminkan {
        from: u8,
        tiles: [Tile; 4],
        called: u8,
    },
    Daiminkan {
        from: u8,
        tiles: [Tile; 4],
        called: u8,
    },
    Ankan {
        tiles: [Tile; 4],
    },
    /// Three-player north declaration.
    Kita {
        from: u8,
        tile: Tile,
    },
}

impl Meld {
    /// Decode the packed call integer.
    ///
    /// Branch selection: bit 2 set = chi; else bits 3-4 = pon or
    /// added kan; else bit 5 = kita; else kan (closed when the seat
    /// offset is 0, open otherwise).
    pub fn decode(data: u32) -> Result<Meld> {
        let from = (data & 0x3) as u8;
        if data & 0x4 != 0 {
            Self::decode_chi(data, from)
        } else if data & 0x18 != 0 {
            Self::decode_pon_shouminkan(data, from)
        } else if data & 0x20 != 0 {
            let tile = Tile::new(data >> 8)?;
            Ok(Meld::Kita { from, tile })
        } else {
            Self::decode_kan(data, from)
        }
    }

    fn decode_chi(data: u32, from: u8) -> Result<Meld> {
        let copies = [(data >> 3) & 3, (data >> 5) & 3, (data >> 7) & 3];
        let base_and_called = data >> 10;
        let called = (base_and_called % 3) as u8;
        let packed_base = base_and_called / 3;
        // Run starts are packed 7 per suit (1..7); widen back to the
        // 9-per-suit kind index.
        let base = (packed_base / 7) * 9 + packed_base % 7;
        let mut tiles = [Tile::new(0)?; 3];
        for (i, tile) in tiles.iter_mut().enumerate() {
            *tile = Tile::new(copies[i] + 4 * (base + i as u32))?;
        }
        Ok(Meld::Chi {
            from,
            tiles,
            called,
        })
    }

    fn decode_pon_shouminkan(data: u32, from: u8) -> Result<Meld> {
        let unused = ((data >> 5) & 3) as usize;
        // The three copies of a pon are whichever of 0..3 is not the
        // unused one; the added-kan tile is the unused copy itself.
        let copies: [u32; 3] = match unused {
            0 => [1, 2, 3],
            1 => [0, 2, 3],
            2 => [0, 1, 3],
            _ => [0, 1, 2],
        };
        let base_and_called = data >> 9;
        let called = (base_and_called % 3) as u8;
        let base = base_and_called / 3;
        if data & 0x8 != 0 {
            let mut tiles = [Tile::new(0)?; 3];
            for (i, tile) in tiles.iter_mut().enumerate() {
                *tile = Tile::new(copies[i] + 4 * base)?;
            }
            Ok(Meld::Pon {
                from,
                tiles,
                called,
            })
        } else {
            let tiles = [
                Tile::new(copies[0] + 4 * base)?,
                Tile::new(copies[1] + 4 * base)?,
                Tile::new(copies[2] + 4 * base)?,
                Tile::new(unused as u32 + 4 * base)?,
            ];
            Ok(Meld::Shouminkan {
                from,
                tiles,
                called,
            })
        }
    }

    fn decode_kan(data: u32, from: u8) -> Result<Meld> {
        let base_and_called = data >> 8;
        let base = base_and_called / 4;
        let mut tiles = [Tile::new(0)?; 4];
        for (i, tile) in tiles.iter_mut().enumerate() {
            *tile = Tile::new(i as u32 + 4 * base)?;
        }
        if from == 0 {
            Ok(Meld::Ankan { tiles })
        } else {
            Ok(Meld::Daiminkan {
                from,
                tiles,
                called: (base_and_called % 4) as u8,
            })
        }
    }

    /// Relative seat offset of the claimed tile's source (0 for
    /// closed calls).
    pub fn from(&self) -> u8 {
        match *self {
            Meld::Chi { from, .. }
            | Meld::Pon { from, .. }
            | Meld::Shouminkan { from, .. }
            | Meld::Daiminkan { from, .. }
            | Meld::Kita { from, .. } => from,
            Meld::Ankan { .. } => 0,
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        match self {
            Meld::Chi { tiles, .. } | Meld::Pon { tiles, .. } => tiles,
            Meld::Shouminkan { tiles, .. }
            | Meld::Daiminkan { tiles, .. }
            | Meld::Ankan { tiles } => tiles,
            Meld::Kita { tile, .. } => std::slice::from_ref(tile),
        }
    }

    /// Index of the claimed tile within `tiles()`, if the call took a
    /// discard.
    pub fn called_index(&self) -> Option<usize> {
        match *self {
            Meld::Chi { called, .. } | Meld::Pon { called, .. } => Some(called as usize),
            Meld::Daiminkan { called, .. } => Some(called as usize),
            Meld::Shouminkan { .. } | Meld::Ankan { .. } | Meld::Kita { .. } => None,
        }
    }

    pub fn is_kan(&self) -> bool {
        matches!(
            self,
            Meld::Shouminkan { .. } | Meld::Daiminkan { .. } | Meld::Ankan { .. }
        )
    }
}

impl TryFrom<u32> for Meld {
    type Error = TenhouError;

    fn try_from(data: u32) -> Result<Meld> {
        Meld::decode(data)
    }
}
