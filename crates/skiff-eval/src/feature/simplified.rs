//! The simplified threat feature set: 15 776 dimensions.
//!
//! Presence occupies `[0, 768)`. Each colored attacker then owns a block of
//! `2 * total` threat cells: an enemy flag (same-side defense vs. attack on
//! the other side) selects the half, the origin's prefix sum selects the
//! row, and the target's rank within the empty-board attack mask selects the
//! cell.

use skiff_core::{Bitboard, Color, Piece, PieceKind, Square, attacks};

use super::offsets::ThreatOffsets;
use super::{FeatureSet, PRESENCE_DIMENSIONS, orient_square, recolor};

/// The simplified threat layout.
pub struct SimplifiedThreats {
    offsets: ThreatOffsets,
}

impl SimplifiedThreats {
    /// Number of feature dimensions: 768 presence + 15 008 threats.
    pub const DIMENSIONS: u32 = 15_776;

    /// Layout hash embedded in parameter files.
    pub const HASH: u32 = 0x3b82_5f17;

    /// Build the layout, computing its threat-offset table.
    pub fn new() -> SimplifiedThreats {
        let offsets = ThreatOffsets::build(|_, total| 2 * total);
        debug_assert_eq!(
            PRESENCE_DIMENSIONS + offsets.threat_dimensions(),
            Self::DIMENSIONS
        );
        SimplifiedThreats { offsets }
    }
}

impl Default for SimplifiedThreats {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureSet for SimplifiedThreats {
    fn dimensions(&self) -> u32 {
        Self::DIMENSIONS
    }

    fn hash(&self) -> u32 {
        Self::HASH
    }

    fn max_active(&self) -> usize {
        128
    }

    fn presence_index(&self, persp: Color, piece: Piece, sq: Square, ksq: Square) -> u32 {
        let sq = orient_square(persp, ksq, sq);
        let piece = recolor(persp, piece);
        piece.index() as u32 * 64 + sq.index() as u32
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
        // Color inequality is invariant under joint recoloring, so the flag
        // can be read off the raw pieces.
        let enemy = (attacker.color() != victim.color()) as u32;

        let from = orient_square(persp, ksq, from);
        let to = orient_square(persp, ksq, to);
        let attacker = recolor(persp, attacker);

        let mask = match attacker.kind() {
            PieceKind::Pawn => attacks::pawn_attacks(attacker.color(), from),
            kind => attacks::piece_attacks(kind, from, Bitboard::EMPTY),
        };
        debug_assert!(mask.contains(to), "target outside the empty-board mask");
        let rank = (mask & Bitboard::below(to)).count();

        Some(
            PRESENCE_DIMENSIONS
                + self.offsets.base(attacker)
                + enemy * self.offsets.total_for(attacker)
                + self.offsets.prefix(attacker, from)
                + rank,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::SimplifiedThreats;
    use crate::feature::{FeatureSet, IndexList, PRESENCE_DIMENSIONS};
    use skiff_core::{Bitboard, Board, Color, Piece, PieceKind, Square, attacks};

    #[test]
    fn presence_indices_cover_their_range() {
        let fs = SimplifiedThreats::new();
        let mut seen = vec![false; PRESENCE_DIMENSIONS as usize];
        for piece in Piece::ALL {
            for sq in Square::all() {
                let idx = fs.presence_index(Color::White, piece, sq, Square::A1) as usize;
                assert!(idx < PRESENCE_DIMENSIONS as usize);
                assert!(!seen[idx], "duplicate presence index {idx}");
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|&v| v));
    }

    /// Every valid threat tuple maps to a distinct index, and the threat
    /// half of the space is covered exactly.
    #[test]
    fn threat_indexer_is_injective_and_total() {
        let fs = SimplifiedThreats::new();
        let ksq = Square::A1; // identity orientation for White
        let mut seen = vec![false; SimplifiedThreats::DIMENSIONS as usize];
        let mut count = 0u32;

        for attacker in Piece::ALL {
            let mask_at = |from: Square| match attacker.kind() {
                PieceKind::Pawn => {
                    if (1..=6).contains(&from.rank()) {
                        attacks::pawn_attacks(attacker.color(), from)
                    } else {
                        Bitboard::EMPTY
                    }
                }
                kind => attacks::piece_attacks(kind, from, Bitboard::EMPTY),
            };
            for from in Square::all() {
                for to in mask_at(from) {
                    for victim_color in Color::ALL {
                        let victim = Piece::new(PieceKind::Pawn, victim_color);
                        let idx = fs
                            .threat_index(Color::White, attacker, from, to, victim, ksq)
                            .expect("simplified threats are total") as usize;
                        assert!(
                            (PRESENCE_DIMENSIONS as usize..seen.len()).contains(&idx),
                            "threat index {idx} out of range"
                        );
                        assert!(!seen[idx], "duplicate threat index {idx}");
                        seen[idx] = true;
                        count += 1;
                    }
                }
            }
        }

        assert_eq!(count, 15_008);
        assert!(seen[PRESENCE_DIMENSIONS as usize..].iter().all(|&v| v));
    }

    /// The enemy flag — not the victim's kind — selects the block half.
    #[test]
    fn victim_kind_does_not_matter() {
        let fs = SimplifiedThreats::new();
        let a = fs.threat_index(
            Color::White,
            Piece::WHITE_ROOK,
            Square::A1,
            Square::A4,
            Piece::BLACK_PAWN,
            Square::E1,
        );
        let b = fs.threat_index(
            Color::White,
            Piece::WHITE_ROOK,
            Square::A1,
            Square::A4,
            Piece::BLACK_QUEEN,
            Square::E1,
        );
        let c = fs.threat_index(
            Color::White,
            Piece::WHITE_ROOK,
            Square::A1,
            Square::A4,
            Piece::WHITE_QUEEN,
            Square::E1,
        );
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    /// Knight on b1, black pawn on c3, kings on e1/e8; White perspective.
    ///
    /// The e1 king sits on the right half, so orientation mirrors files
    /// (mask 7).
    #[test]
    fn knight_scenario_literal_indices() {
        let fs = SimplifiedThreats::new();
        let board: Board = "4k3/8/8/8/8/2p5/8/1N2K3 w - - 0 1".parse().unwrap();
        let ksq = board.king_square(Color::White);
        assert_eq!(ksq, Square::E1);

        // Presence: WN on b1 -> g1 (6): 1*64 + 6 = 70.
        assert_eq!(
            fs.presence_index(Color::White, Piece::WHITE_KNIGHT, Square::B1, ksq),
            70
        );
        // Presence: BP on c3 -> f3 (21): (6+0)*64 + 21 = 405.
        assert_eq!(
            fs.presence_index(Color::White, Piece::BLACK_PAWN, Square::C3, ksq),
            405
        );

        // Threat: N b1->c3 orients to g1->f3. knight_attacks(g1) = {e2, f3, h3};
        // e2 (12) precedes f3 (21), so the in-mask rank is 1. The knight block
        // starts at 2*84 = 168 with per-square prefix 21 at g1, and the enemy
        // half adds one knight total (336):
        // 768 + 168 + 336 + 21 + 1 = 1294.
        assert_eq!(
            fs.threat_index(
                Color::White,
                Piece::WHITE_KNIGHT,
                Square::B1,
                Square::C3,
                Piece::BLACK_PAWN,
                ksq
            ),
            Some(1294)
        );

        // Extraction agrees: knight + pawn + the two kings as presence, and
        // the knight capture threat as the single threat.
        let mut presence = IndexList::new();
        let mut threats = IndexList::new();
        fs.append_active_features(&board, Color::White, &mut presence, &mut threats);
        assert_eq!(presence.len(), 4);
        assert!(presence.contains(&70));
        assert!(presence.contains(&405));
        assert_eq!(threats.as_slice(), &[1294]);
    }

    /// Threat extraction is a pure function of board and perspective.
    #[test]
    fn extraction_is_reproducible() {
        let fs = SimplifiedThreats::new();
        let board = Board::starting_position();
        for persp in Color::ALL {
            let mut a = IndexList::new();
            let mut b = IndexList::new();
            fs.append_active_threats(&board, persp, &mut a);
            fs.append_active_threats(&board, persp, &mut b);
            assert_eq!(a.as_slice(), b.as_slice());
            assert!(a.is_sorted(), "threat runs concatenate into sorted order");
        }
    }

    /// Starting position: 32 presence features; the threat list mirrors
    /// between the two perspectives by symmetry.
    #[test]
    fn starting_position_extraction() {
        let fs = SimplifiedThreats::new();
        let board = Board::starting_position();

        let mut white_p = IndexList::new();
        let mut white_t = IndexList::new();
        fs.append_active_features(&board, Color::White, &mut white_p, &mut white_t);
        let mut black_p = IndexList::new();
        let mut black_t = IndexList::new();
        fs.append_active_features(&board, Color::Black, &mut black_p, &mut black_t);

        assert_eq!(white_p.len(), 32);
        assert_eq!(black_p.len(), 32);
        // Defenses count: each back rank protects itself and its pawn
        // shield for 20 same-side threats per color.
        assert_eq!(white_t.len(), 40);
        assert_eq!(white_t.as_slice(), black_t.as_slice());

        let mut wp = white_p.to_vec();
        let mut bp = black_p.to_vec();
        wp.sort_unstable();
        bp.sort_unstable();
        assert_eq!(wp, bp);
    }
}
