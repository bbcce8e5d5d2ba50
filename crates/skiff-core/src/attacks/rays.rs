//! Classical ray-lookup slider attacks.
//!
//! For each direction a precomputed ray runs from the origin to the board
//! edge. Slider attacks truncate each ray at its first blocker: the blocker
//! square stays attacked, everything beyond it is removed by xoring in the
//! blocker's own ray.

use crate::bitboard::Bitboard;
use crate::square::Square;

/// Direction deltas as (rank, file) steps. The first half steps toward
/// higher square indices, the second half toward lower ones.
const DIRS: [(i8, i8); 8] = [
    (1, 0),   // north
    (0, 1),   // east
    (1, 1),   // north-east
    (1, -1),  // north-west
    (-1, 0),  // south
    (0, -1),  // west
    (-1, -1), // south-west
    (-1, 1),  // south-east
];

const fn ray_table() -> [[Bitboard; 64]; 8] {
    let mut table = [[Bitboard::EMPTY; 64]; 8];
    let mut d = 0usize;
    while d < 8 {
        let mut sq = 0usize;
        while sq < 64 {
            let mut bits = 0u64;
            let mut r = (sq / 8) as i8 + DIRS[d].0;
            let mut f = (sq % 8) as i8 + DIRS[d].1;
            while r >= 0 && r < 8 && f >= 0 && f < 8 {
                bits |= 1u64 << (r as usize * 8 + f as usize);
                r += DIRS[d].0;
                f += DIRS[d].1;
            }
            table[d][sq] = Bitboard::new(bits);
            sq += 1;
        }
        d += 1;
    }
    table
}

static RAYS: [[Bitboard; 64]; 8] = ray_table();

#[inline]
fn ray_attack(dir: usize, sq: Square, occupied: Bitboard) -> Bitboard {
    let ray = RAYS[dir][sq.index()];
    let blockers = ray & occupied;
    // Directions 0..4 increase the square index, so the nearest blocker is
    // the lsb; for the others it is the msb.
    let first = if dir < 4 { blockers.lsb() } else { blockers.msb() };
    match first {
        Some(blocker) => ray ^ RAYS[dir][blocker.index()],
        None => ray,
    }
}

/// Rook attacks from `sq` given `occupied` squares.
#[inline]
pub(crate) fn rook_attacks_lookup(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attack(0, sq, occupied)
        | ray_attack(1, sq, occupied)
        | ray_attack(4, sq, occupied)
        | ray_attack(5, sq, occupied)
}

/// Bishop attacks from `sq` given `occupied` squares.
#[inline]
pub(crate) fn bishop_attacks_lookup(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attack(2, sq, occupied)
        | ray_attack(3, sq, occupied)
        | ray_attack(6, sq, occupied)
        | ray_attack(7, sq, occupied)
}
