//! The full threat feature set: 80 624 dimensions.
//!
//! Threats occupy `[0, 79856)` and are refined per attacker-victim pair: a
//! validity map assigns each representable victim kind a sub-block, and
//! impossible pairs (a pawn can never attack a standing king, a king can
//! never attack a defended queen, ...) have no feature at all. Mutual
//! same-kind threats always co-occur, so the `from < to` copy is dropped.
//! Presence sits above the threats at `[79856, 80624)`.

use skiff_core::{Bitboard, Color, Piece, PieceKind, Square, attacks};

use super::offsets::ThreatOffsets;
use super::{FeatureSet, PRESENCE_DIMENSIONS, orient_square, recolor};

/// Representable victim kinds per attacker kind (both colors).
const NUM_VALID_TARGETS: [u32; PieceKind::COUNT] = [6, 12, 10, 10, 12, 8];

/// Sub-block of each victim kind within an attacker's range, `-1` for pairs
/// with no feature. Rows are attacker kinds, columns victim kinds.
const TARGET_MAP: [[i8; PieceKind::COUNT]; PieceKind::COUNT] = [
    [0, 1, -1, 2, -1, -1],
    [0, 1, 2, 3, 4, 5],
    [0, 1, 2, 3, -1, 4],
    [0, 1, 2, 3, -1, 4],
    [0, 1, 2, 3, 4, 5],
    [0, 1, 2, 3, -1, -1],
];

/// The full threat layout.
pub struct FullThreats {
    offsets: ThreatOffsets,
}

impl FullThreats {
    /// Number of feature dimensions: 79 856 threats + 768 presence.
    pub const DIMENSIONS: u32 = 80_624;

    /// Layout hash embedded in parameter files.
    pub const HASH: u32 = 0x7f23_4cb8;

    /// Base of the presence block.
    const PRESENCE_BASE: u32 = 79_856;

    /// Build the layout, computing its threat-offset table.
    pub fn new() -> FullThreats {
        let offsets =
            ThreatOffsets::build(|piece, total| NUM_VALID_TARGETS[piece.kind().index()] * total);
        debug_assert_eq!(offsets.threat_dimensions(), Self::PRESENCE_BASE);
        debug_assert_eq!(Self::PRESENCE_BASE + PRESENCE_DIMENSIONS, Self::DIMENSIONS);
        FullThreats { offsets }
    }
}

impl Default for FullThreats {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureSet for FullThreats {
    fn dimensions(&self) -> u32 {
        Self::DIMENSIONS
    }

    fn hash(&self) -> u32 {
        Self::HASH
    }

    fn max_active(&self) -> usize {
        160
    }

    fn presence_index(&self, persp: Color, piece: Piece, sq: Square, ksq: Square) -> u32 {
        let sq = orient_square(persp, ksq, sq);
        let piece = recolor(persp, piece);
        Self::PRESENCE_BASE + piece.index() as u32 * 64 + sq.index() as u32
    }

    fn threat_index(
        &self,
        persp: Color,
        attacker: Piece,
        from: Square,
        to: Square,
        victim: Piece,
        ksq: Square,
    ) -> Option<u32> {
        let enemy = attacker.color() != victim.color();

        let from = orient_square(persp, ksq, from);
        let to = orient_square(persp, ksq, to);
        let attacker = recolor(persp, attacker);
        let victim = recolor(persp, victim);

        let kind = attacker.kind();
        let sub_block = TARGET_MAP[kind.index()][victim.kind().index()];
        if sub_block < 0 {
            return None;
        }
        // Same-kind threats between squares come in mutual pairs (except
        // same-side pawns, which cannot defend each other); keep one copy.
        if kind == victim.kind() && (enemy || kind != PieceKind::Pawn) && from < to {
            return None;
        }

        let mask = match kind {
            PieceKind::Pawn => attacks::pawn_attacks(attacker.color(), from),
            kind => attacks::piece_attacks(kind, from, Bitboard::EMPTY),
        };
        debug_assert!(mask.contains(to), "target outside the empty-board mask");
        let rank = (mask & Bitboard::below(to)).count();

        let victim_color = victim.color().index() as u32;
        Some(
            self.offsets.base(attacker)
                + (victim_color * (NUM_VALID_TARGETS[kind.index()] / 2) + sub_block as u32)
                    * self.offsets.total_for(attacker)
                + self.offsets.prefix(attacker, from)
                + rank,
        )
    }
}
