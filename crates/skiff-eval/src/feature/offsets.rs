//! Per-(piece, origin) prefix sums of empty-board attack counts.

use skiff_core::{Bitboard, Piece, PieceKind, Square, attacks};

/// Lookup table placing each colored piece's threat sub-range.
///
/// Slots are keyed by the raw piece code (0-5 White, 8-13 Black); the other
/// four slots stay zero and must never be indexed. Per valid slot:
/// - `[from]` for `from in 0..64`: attack-count prefix sum over origins
///   `0..from` (empty occupancy; pawns contribute only from ranks 2-7),
/// - `[64]`: the piece's total attack count over all origins,
/// - `[65]`: the running base of this piece's block in the threat space.
pub(crate) struct ThreatOffsets {
    table: [[u32; 66]; Piece::RAW_SLOTS],
    total: u32,
}

impl ThreatOffsets {
    /// Build the table, advancing each piece's block by
    /// `block_width(piece, total)`.
    pub(crate) fn build(block_width: impl Fn(Piece, u32) -> u32) -> ThreatOffsets {
        let mut table = [[0u32; 66]; Piece::RAW_SLOTS];
        let mut piece_offset = 0u32;

        for raw in 0..Piece::RAW_SLOTS as u8 {
            let Some(piece) = Piece::from_raw(raw) else {
                continue;
            };
            let slot = &mut table[raw as usize];
            slot[65] = piece_offset;

            let mut square_offset = 0u32;
            for from in Square::all() {
                slot[from.index()] = square_offset;
                square_offset += match piece.kind() {
                    PieceKind::Pawn => {
                        if (1..=6).contains(&from.rank()) {
                            attacks::pawn_attacks(piece.color(), from).count()
                        } else {
                            0
                        }
                    }
                    kind => attacks::piece_attacks(kind, from, Bitboard::EMPTY).count(),
                };
            }
            slot[64] = square_offset;
            piece_offset += block_width(piece, square_offset);
        }

        ThreatOffsets {
            table,
            total: piece_offset,
        }
    }

    /// Attack-count prefix sum for origins preceding `from`.
    #[inline]
    pub(crate) fn prefix(&self, piece: Piece, from: Square) -> u32 {
        self.table[piece.raw() as usize][from.index()]
    }

    /// Total attack count for this piece over all origins.
    #[inline]
    pub(crate) fn total_for(&self, piece: Piece) -> u32 {
        self.table[piece.raw() as usize][64]
    }

    /// Base of this piece's block within the threat space.
    #[inline]
    pub(crate) fn base(&self, piece: Piece) -> u32 {
        self.table[piece.raw() as usize][65]
    }

    /// Width of the whole threat space (the running base after all pieces).
    #[inline]
    pub(crate) fn threat_dimensions(&self) -> u32 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::ThreatOffsets;
    use skiff_core::{Piece, Square};

    /// Empty-board attack totals per kind, summed over all 64 origins.
    const KIND_TOTALS: [(Piece, u32); 6] = [
        (Piece::WHITE_PAWN, 84),
        (Piece::WHITE_KNIGHT, 336),
        (Piece::WHITE_BISHOP, 560),
        (Piece::WHITE_ROOK, 896),
        (Piece::WHITE_QUEEN, 1456),
        (Piece::WHITE_KING, 420),
    ];

    #[test]
    fn per_piece_totals() {
        let offsets = ThreatOffsets::build(|_, total| 2 * total);
        for (piece, expected) in KIND_TOTALS {
            assert_eq!(offsets.total_for(piece), expected, "{piece:?}");
            assert_eq!(offsets.total_for(piece.flip_color()), expected);
        }
    }

    #[test]
    fn prefix_is_monotone_and_consistent() {
        let offsets = ThreatOffsets::build(|_, total| 2 * total);
        for piece in Piece::ALL {
            let mut prev = 0;
            for from in Square::all() {
                let p = offsets.prefix(piece, from);
                assert!(p >= prev, "{piece:?} prefix not monotone at {from}");
                prev = p;
            }
            assert!(offsets.total_for(piece) >= prev);
        }
    }

    #[test]
    fn doubled_blocks_sum_to_simplified_threat_space() {
        let offsets = ThreatOffsets::build(|_, total| 2 * total);
        // 2 * 2 * (84 + 336 + 560 + 896 + 1456 + 420) = 15008
        assert_eq!(offsets.threat_dimensions(), 15008);
    }

    #[test]
    fn pawn_back_ranks_contribute_nothing() {
        let offsets = ThreatOffsets::build(|_, total| 2 * total);
        // Prefix is flat across rank 1 and only starts growing on rank 2.
        assert_eq!(offsets.prefix(Piece::WHITE_PAWN, Square::H1), 0);
        assert_eq!(offsets.prefix(Piece::WHITE_PAWN, Square::A2), 0);
        assert!(offsets.prefix(Piece::WHITE_PAWN, Square::A3) > 0);
        // Rank 8 adds nothing on top of the rank-7 total.
        assert_eq!(
            offsets.prefix(Piece::WHITE_PAWN, Square::A8),
            offsets.total_for(Piece::WHITE_PAWN)
        );
    }

    #[test]
    fn block_bases_follow_slot_order() {
        let offsets = ThreatOffsets::build(|_, total| 2 * total);
        let order = [
            Piece::WHITE_PAWN,
            Piece::WHITE_KNIGHT,
            Piece::WHITE_BISHOP,
            Piece::WHITE_ROOK,
            Piece::WHITE_QUEEN,
            Piece::WHITE_KING,
            Piece::BLACK_PAWN,
            Piece::BLACK_KNIGHT,
            Piece::BLACK_BISHOP,
            Piece::BLACK_ROOK,
            Piece::BLACK_QUEEN,
            Piece::BLACK_KING,
        ];
        for pair in order.windows(2) {
            assert!(
                offsets.base(pair[0]) < offsets.base(pair[1]),
                "{:?} block must precede {:?}",
                pair[0],
                pair[1]
            );
        }
        assert_eq!(offsets.base(Piece::WHITE_PAWN), 0);
        assert_eq!(offsets.base(Piece::WHITE_KNIGHT), 2 * 84);
    }
}
