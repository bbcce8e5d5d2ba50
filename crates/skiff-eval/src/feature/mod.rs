//! Feature sets: the mapping from board state to active feature indices.
//!
//! A feature set pairs two indexers — presence (`from == to`) and threat
//! (attacker on `from` attacks the piece on `to`) — with extraction routines
//! that enumerate every active index for one perspective. Two sets share the
//! interface: [`SimplifiedThreats`](simplified::SimplifiedThreats) (15 776
//! dimensions, the default) and [`FullThreats`](full::FullThreats) (80 624
//! dimensions).

pub mod full;
pub mod simplified;

mod offsets;

use arrayvec::ArrayVec;
use skiff_core::{Board, Color, Piece, PieceKind, Square, attacks};

use crate::chain::DirtyPiece;

/// Upper bound on simultaneously active features, shared by both variants.
pub const MAX_ACTIVE: usize = 160;

/// A bounded list of feature indices. Pushing past the cap panics, which is
/// the required handling for an extractor overflow.
pub type IndexList = ArrayVec<u32, MAX_ACTIVE>;

/// Width of the presence sub-space: 12 pieces times 64 squares.
pub const PRESENCE_DIMENSIONS: u32 = 768;

/// Per-perspective, per-king-square orientation xor masks.
///
/// The far side's king looks up the board (vertical mirror, bit 0x38), and a
/// king on files e-h is mirrored onto files a-d (horizontal mirror, 0x07).
const ORIENT: [[u8; 64]; 2] = {
    let mut table = [[0u8; 64]; 2];
    let mut persp = 0;
    while persp < 2 {
        let mut ksq = 0;
        while ksq < 64 {
            let horizontal = if ksq % 8 >= 4 { 7 } else { 0 };
            let vertical = if persp == 1 { 56 } else { 0 };
            table[persp][ksq] = horizontal | vertical;
            ksq += 1;
        }
        persp += 1;
    }
    table
};

/// The orientation mask active for `persp` with its king on `ksq`.
#[inline]
pub fn orient_mask(persp: Color, ksq: Square) -> u8 {
    ORIENT[persp.index()][ksq.index()]
}

/// Orient `sq` into the perspective's reference frame.
#[inline]
pub fn orient_square(persp: Color, ksq: Square, sq: Square) -> Square {
    Square::from_index_unchecked(sq.index() as u8 ^ orient_mask(persp, ksq))
}

/// Swap piece colors when viewed from Black's perspective.
#[inline]
pub(crate) fn recolor(persp: Color, piece: Piece) -> Piece {
    match persp {
        Color::White => piece,
        Color::Black => piece.flip_color(),
    }
}

/// A feature layout: indexing plus extraction for one input dimensionality.
pub trait FeatureSet {
    /// Total number of feature dimensions.
    fn dimensions(&self) -> u32;

    /// Layout hash embedded in parameter files.
    fn hash(&self) -> u32;

    /// Cap on simultaneously active features for this layout.
    fn max_active(&self) -> usize;

    /// Presence feature index for `piece` standing on `sq`.
    fn presence_index(&self, persp: Color, piece: Piece, sq: Square, ksq: Square) -> u32;

    /// Threat feature index for `attacker` on `from` attacking `victim` on
    /// `to`, or `None` when the layout does not represent this pair.
    ///
    /// `to` must be attacked from `from` under *empty* occupancy — the index
    /// space is laid out against empty-board attack masks even though
    /// detection runs against real occupancy.
    fn threat_index(
        &self,
        persp: Color,
        attacker: Piece,
        from: Square,
        to: Square,
        victim: Piece,
        ksq: Square,
    ) -> Option<u32>;

    /// Append every active feature of `board` for `persp`: presence indices
    /// in (color, kind, square) iteration order, threat indices as sorted
    /// per-(color, kind) runs.
    fn append_active_features(
        &self,
        board: &Board,
        persp: Color,
        presence: &mut IndexList,
        threats: &mut IndexList,
    ) where
        Self: Sized,
    {
        extract(self, board, persp, Some(&mut *presence), Some(&mut *threats));
        debug_assert!(
            presence.len() + threats.len() <= self.max_active(),
            "active feature count exceeds the layout cap"
        );
    }

    /// Append only the presence indices.
    fn append_active_psq(&self, board: &Board, persp: Color, presence: &mut IndexList)
    where
        Self: Sized,
    {
        extract(self, board, persp, Some(presence), None);
    }

    /// Append only the threat indices.
    fn append_active_threats(&self, board: &Board, persp: Color, threats: &mut IndexList)
    where
        Self: Sized,
    {
        extract(self, board, persp, None, Some(threats));
    }

    /// Presence deltas read directly off a dirty-piece record: vacated
    /// squares land in `removed`, entered squares in `added`.
    fn append_changed_presence(
        &self,
        persp: Color,
        ksq: Square,
        dirty: &DirtyPiece,
        removed: &mut IndexList,
        added: &mut IndexList,
    ) {
        for entry in dirty.as_slice() {
            if let Some(from) = entry.from {
                removed.push(self.presence_index(persp, entry.piece, from, ksq));
            }
            if let Some(to) = entry.to {
                added.push(self.presence_index(persp, entry.piece, to, ksq));
            }
        }
    }

    /// Whether the move recorded in `dirty` invalidates every index of this
    /// perspective: the king moved and its orientation mask changed.
    fn requires_refresh(&self, dirty: &DirtyPiece, persp: Color) -> bool {
        let Some(entry) = dirty.as_slice().first() else {
            return false;
        };
        if entry.piece != Piece::new(PieceKind::King, persp) {
            return false;
        }
        match (entry.from, entry.to) {
            (Some(from), Some(to)) => orient_mask(persp, from) != orient_mask(persp, to),
            _ => false,
        }
    }
}

/// Shared extraction walk. Iterates colors `[persp, !persp]` then kinds
/// `Pawn..King`; presence goes out in iteration order, threats are sorted
/// per run. Because each attacker's threat block is laid down in the same
/// order the runs are emitted, the concatenated threat list is globally
/// ascending.
fn extract<F: FeatureSet>(
    features: &F,
    board: &Board,
    persp: Color,
    mut presence: Option<&mut IndexList>,
    mut threats: Option<&mut IndexList>,
) {
    let ksq = board.king_square(persp);
    let occupied = board.occupied();
    let mut run = IndexList::new();

    for color in [persp, persp.flip()] {
        for kind in PieceKind::ALL {
            let attacker = Piece::new(kind, color);
            run.clear();

            for from in board.pieces_of(color, kind) {
                if let Some(out) = presence.as_mut() {
                    out.push(features.presence_index(persp, attacker, from, ksq));
                }
                if threats.is_none() {
                    continue;
                }

                let mask = if kind == PieceKind::Pawn {
                    attacks::pawn_attacks(color, from)
                } else {
                    attacks::piece_attacks(kind, from, occupied)
                };
                for to in mask & occupied {
                    let victim = board.piece_at(to).expect("attacked square is occupied");
                    if let Some(index) =
                        features.threat_index(persp, attacker, from, to, victim, ksq)
                    {
                        run.push(index);
                    }
                }
            }

            if let Some(out) = threats.as_mut() {
                run.sort_unstable();
                out.extend(run.iter().copied());
            }
        }
    }
}
