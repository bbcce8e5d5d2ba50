//! Precomputed leaper attack tables.

use crate::bitboard::Bitboard;

const fn leaper_table(deltas: [(i8, i8); 8]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0usize;
    while sq < 64 {
        let rank = (sq / 8) as i8;
        let file = (sq % 8) as i8;
        let mut bits = 0u64;
        let mut d = 0;
        while d < 8 {
            let r = rank + deltas[d].0;
            let f = file + deltas[d].1;
            if r >= 0 && r < 8 && f >= 0 && f < 8 {
                bits |= 1u64 << (r as usize * 8 + f as usize);
            }
            d += 1;
        }
        table[sq] = Bitboard::new(bits);
        sq += 1;
    }
    table
}

/// Pawn attack tables for both colors (index 0 = White, 1 = Black).
///
/// Wrapping is prevented by masking out the opposite edge file.
const fn pawn_table() -> [[Bitboard; 64]; 2] {
    const FILE_A_BITS: u64 = 0x0101_0101_0101_0101;
    const FILE_H_BITS: u64 = 0x8080_8080_8080_8080;

    let mut table = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0usize;
    while sq < 64 {
        let bit = 1u64 << sq;

        // White attacks north-west (shl 7) and north-east (shl 9).
        let white = ((bit << 7) & !FILE_H_BITS) | ((bit << 9) & !FILE_A_BITS);
        table[0][sq] = Bitboard::new(white);

        // Black attacks south-east (shr 7) and south-west (shr 9).
        let black = ((bit >> 7) & !FILE_A_BITS) | ((bit >> 9) & !FILE_H_BITS);
        table[1][sq] = Bitboard::new(black);

        sq += 1;
    }
    table
}

pub(crate) static KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table([
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
]);

pub(crate) static KING_ATTACKS: [Bitboard; 64] = leaper_table([
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
]);

pub(crate) static PAWN_ATTACKS: [[Bitboard; 64]; 2] = pawn_table();
