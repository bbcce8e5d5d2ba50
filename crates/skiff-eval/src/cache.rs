//! The full-refresh cache: golden accumulators keyed by king square.

use skiff_core::{Bitboard, Color, PieceKind, Square};

use crate::accumulator::HIDDEN;

/// One cache slot: the accumulation and board contents as of the last
/// refresh that used this slot.
pub(crate) struct CacheEntry {
    pub(crate) accumulation: [i16; HIDDEN],
    pub(crate) by_color: [Bitboard; Color::COUNT],
    pub(crate) by_kind: [Bitboard; PieceKind::COUNT],
    /// Sorted threat list of the last refresh.
    pub(crate) threats: Vec<u32>,
}

/// Per-perspective, per-king-square cache of golden accumulators.
///
/// A refresh lands in the slot of the refreshed perspective's king square,
/// diffs the slot's remembered board against the current one, and patches
/// the golden accumulation instead of rebuilding it from the bias. Slots
/// start from the bias over an empty board, which is exactly the zero-
/// feature accumulation.
///
/// The cache belongs to one chain of positions; it is never shared.
pub struct RefreshCache {
    entries: Vec<CacheEntry>,
}

impl RefreshCache {
    /// Build a cache with every slot holding the bias over an empty board.
    pub(crate) fn new(biases: &[i16]) -> RefreshCache {
        let mut accumulation = [0i16; HIDDEN];
        accumulation.copy_from_slice(biases);

        let entries = (0..Color::COUNT * Square::COUNT)
            .map(|_| CacheEntry {
                accumulation,
                by_color: [Bitboard::EMPTY; Color::COUNT],
                by_kind: [Bitboard::EMPTY; PieceKind::COUNT],
                threats: Vec::new(),
            })
            .collect();
        RefreshCache { entries }
    }

    /// The slot for `persp` with its king on `ksq`.
    #[inline]
    pub(crate) fn entry_mut(&mut self, persp: Color, ksq: Square) -> &mut CacheEntry {
        &mut self.entries[persp.index() * Square::COUNT + ksq.index()]
    }
}
