use std::io::Read;
use std::path::Path;

use ahash::AHashMap;
use flate2::read::GzDecoder;

use crate::errors::{Result, TenhouError};

pub const SHANTEN_FILE: &str = "shanten.bin.gz";
pub const AGARI_FILE: &str = "agari.bin.gz";

const SUIT_ROWS: usize = 1_953_125; // 5^9
const HONOR_ROWS: usize = 78_125; // 5^7
const ROW_BYTES: usize = 5; // ten nibble values per row

/// Replacement-count seed rows for the shanten merge.
///
/// Row layout (ten values, nibble-packed low-first): indices 0..4 are
/// the tiles needed to complete 0..4 melds in the block, indices 5..9
/// the same with the pair also in this block. Suit rows come first
/// (runs allowed), then a separate honor block where only triplets
/// count.
pub struct ShantenTable {
    rows: Vec<u8>,
}

impl ShantenTable {
    pub fn from_reader(reader: impl Read) -> Result<ShantenTable> {
        let mut rows = Vec::with_capacity((SUIT_ROWS + HONOR_ROWS) * ROW_BYTES);
        GzDecoder::new(reader)
            .read_to_end(&mut rows)
            .map_err(|e| TenhouError::Table(format!("reading shanten table: {}", e)))?;
        if rows.len() != (SUIT_ROWS + HONOR_ROWS) * ROW_BYTES {
            return Err(TenhouError::Table(format!(
                "shanten table has {} bytes, expected {}",
                rows.len(),
                (SUIT_ROWS + HONOR_ROWS) * ROW_BYTES
            )));
        }
        Ok(ShantenTable { rows })
    }

    #[inline]
    fn unpack(&self, row: usize) -> [u8; 10] {
        let bytes = &self.rows[row * ROW_BYTES..row * ROW_BYTES + ROW_BYTES];
        let mut out = [0u8; 10];
        for (j, b) in bytes.iter().enumerate() {
            out[2 * j] = b & 0x0F;
            out[2 * j + 1] = b >> 4;
        }
        out
    }

    /// Row for a number-suit block, keyed by its base-5 hash.
    #[inline]
    pub fn suit_row(&self, hash: usize) -> [u8; 10] {
        debug_assert!(hash < SUIT_ROWS);
        self.unpack(hash)
    }

    /// Row for the honor block, keyed by its base-5 hash.
    #[inline]
    pub fn honor_row(&self, hash: usize) -> [u8; 10] {
        debug_assert!(hash < HONOR_ROWS);
        self.unpack(SUIT_ROWS + hash)
    }
}

/// One decomposition of a winning shape, packed into 32 bits.
///
/// Bits 0-2 triplet count, 3-5 run count, 6-9 pair position, then one
/// 4-bit position per block (triplets first). Positions index into the
/// distinct-kind list produced alongside the shape key. Bits 26-30
/// flag chiitoitsu, chuuren, ittsuu, ryanpeikou and iipeikou.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgariEntry(pub u32);

impl AgariEntry {
    #[inline]
    pub fn triplet_count(&self) -> usize {
        (self.0 & 0b111) as usize
    }

    #[inline]
    pub fn run_count(&self) -> usize {
        ((self.0 >> 3) & 0b111) as usize
    }

    #[inline]
    pub fn pair_position(&self) -> usize {
        ((self.0 >> 6) & 0b1111) as usize
    }

    pub fn triplet_positions(&self) -> Vec<usize> {
        (0..self.triplet_count())
            .map(|n| ((self.0 >> (10 + 4 * n)) & 0b1111) as usize)
            .collect()
    }

    pub fn run_positions(&self) -> Vec<usize> {
        let skip = self.triplet_count();
        (0..self.run_count())
            .map(|n| ((self.0 >> (10 + 4 * (skip + n))) & 0b1111) as usize)
            .collect()
    }

    #[inline]
    pub fn is_chiitoitsu(&self) -> bool {
        self.0 & (1 << 26) != 0
    }

    #[inline]
    pub fn is_chuuren(&self) -> bool {
        self.0 & (1 << 27) != 0
    }

    #[inline]
    pub fn has_ittsuu(&self) -> bool {
        self.0 & (1 << 28) != 0
    }

    #[inline]
    pub fn is_ryanpeikou(&self) -> bool {
        self.0 & (1 << 29) != 0
    }

    #[inline]
    pub fn is_iipeikou(&self) -> bool {
        self.0 & (1 << 30) != 0
    }
}

/// Winning-shape table keyed by the run-length shape key.
pub struct AgariTable {
    map: AHashMap<u32, Vec<AgariEntry>>,
}

impl AgariTable {
    pub fn from_reader(reader: impl Read) -> Result<AgariTable> {
        let mut raw = Vec::new();
        GzDecoder::new(reader)
            .read_to_end(&mut raw)
            .map_err(|e| TenhouError::Table(format!("reading agari table: {}", e)))?;
        let mut map = AHashMap::new();
        let mut pos = 0usize;
        while pos < raw.len() {
            if pos + 5 > raw.len() {
                return Err(TenhouError::Table("truncated agari record".into()));
            }
            let key = u32::from_le_bytes([raw[pos], raw[pos + 1], raw[pos + 2], raw[pos + 3]]);
            let count = raw[pos + 4] as usize;
            pos += 5;
            if pos + count * 4 > raw.len() {
                return Err(TenhouError::Table("truncated agari record".into()));
            }
            let mut entries = Vec::with_capacity(count);
            for _ in 0..count {
                let flags =
                    u32::from_le_bytes([raw[pos], raw[pos + 1], raw[pos + 2], raw[pos + 3]]);
                entries.push(AgariEntry(flags));
                pos += 4;
            }
            map.insert(key, entries);
        }
        Ok(AgariTable { map })
    }

    #[inline]
    pub fn contains(&self, key: u32) -> bool {
        self.map.contains_key(&key)
    }

    #[inline]
    pub fn get(&self, key: u32) -> Option<&[AgariEntry]> {
        self.map.get(&key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Both pre-computed tables. Load once, share everywhere.
pub struct LookupTables {
    pub shanten: ShantenTable,
    pub agari: AgariTable,
}

impl LookupTables {
    /// Loads `shanten.bin.gz` and `agari.bin.gz` from a directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<LookupTables> {
        let dir = dir.as_ref();
        let open = |name: &str| {
            std::fs::File::open(dir.join(name))
                .map_err(|e| TenhouError::Table(format!("opening {}: {}", name, e)))
        };
        Ok(LookupTables {
            shanten: ShantenTable::from_reader(open(SHANTEN_FILE)?)?,
            agari: AgariTable::from_reader(open(AGARI_FILE)?)?,
        })
    }

    /// Builds the tables from the blobs compiled into the crate.
    pub fn bundled() -> Result<LookupTables> {
        static SHANTEN: &[u8] = include_bytes!("../data/shanten.bin.gz");
        static AGARI: &[u8] = include_bytes!("../data/agari.bin.gz");
        Ok(LookupTables {
            shanten: ShantenTable::from_reader(SHANTEN)?,
            agari: AgariTable::from_reader(AGARI)?,
        })
    }
}
