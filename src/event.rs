use serde::Serialize;

use crate::errors::{Result, TenhouError};
use crate::meld::Meld;
use crate::tile::Tile;

/// Why a round ended in a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RyuukyokuKind {
    /// Wall ran out.
    Exhaustive,
    /// Kyuushu kyuuhai declaration.
    NineTerminals,
    FourRiichi,
    TripleRon,
    FourKan,
    FourWinds,
    NagashiMangan,
}

impl RyuukyokuKind {
    /// Maps the optional `type` attribute of a RYUUKYOKU record.
    pub fn from_attr(attr: Option<&str>) -> Result<RyuukyokuKind> {
        match attr {
            None => Ok(RyuukyokuKind::Exhaustive),
            Some("yao9") => Ok(RyuukyokuKind::NineTerminals),
            Some("reach4") => Ok(RyuukyokuKind::FourRiichi),
            Some("ron3") => Ok(RyuukyokuKind::TripleRon),
            Some("kan4") => Ok(RyuukyokuKind::FourKan),
            Some("kaze4") => Ok(RyuukyokuKind::FourWinds),
            Some("nm") => Ok(RyuukyokuKind::NagashiMangan),
            Some(other) => Err(TenhouError::format(
                "RYUUKYOKU",
                format!("unknown draw type `{}`", other),
            )),
        }
    }

    /// Abortive draws end the hand before the wall does.
    pub fn is_abortive(&self) -> bool {
        !matches!(
            self,
            RyuukyokuKind::Exhaustive | RyuukyokuKind::NagashiMangan
        )
    }
}

/// One step of a replayable round. The last event of a sealed round
/// is always one of `Ron`, `Tsumo` or `Ryuukyoku`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    DrawTile { player: u8, tile: Tile },
    DiscardTile { player: u8, tile: Tile },
    Call { player: u8, meld: Meld },
    DoraIndicator { tile: Tile },
    Riichi { player: u8 },
    Ron { winners: Vec<u8>, from: u8 },
    Tsumo { player: u8 },
    Ryuukyoku { kind: RyuukyokuKind },
}

impl Event {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::Ron { .. } | Event::Tsumo { .. } | Event::Ryuukyoku { .. }
        )
    }
}
