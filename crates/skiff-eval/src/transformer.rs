//! The feature transformer: weights, biases, and accumulator maintenance
//! over a position chain.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::debug;

use skiff_core::{Color, Piece, PieceKind};

use crate::accumulator::HIDDEN;
use crate::cache::RefreshCache;
use crate::chain::Chain;
use crate::diff::diff_sorted;
use crate::error::ParamsError;
use crate::feature::{FeatureSet, IndexList};

/// Direction of an incremental update along the position chain.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backwards,
}

/// First-layer weights and biases, plus the algorithms that keep position
/// accumulators equal to `bias + sum of active weight columns`.
pub struct FeatureTransformer<F: FeatureSet> {
    features: F,
    /// Column-major weight matrix: one `HIDDEN`-lane column per feature.
    weights: Box<[i16]>,
    /// Bias vector of dimension `HIDDEN`.
    biases: Box<[i16]>,
}

impl<F: FeatureSet> FeatureTransformer<F> {
    /// A zero-weight transformer for the given feature layout.
    pub fn new(features: F) -> FeatureTransformer<F> {
        let dims = features.dimensions() as usize;
        FeatureTransformer {
            weights: vec![0; dims * HIDDEN].into_boxed_slice(),
            biases: vec![0; HIDDEN].into_boxed_slice(),
            features,
        }
    }

    /// The feature layout this transformer was built for.
    #[inline]
    pub fn features(&self) -> &F {
        &self.features
    }

    /// Layout hash: the feature-set hash combined with the output width.
    pub fn hash_value(&self) -> u32 {
        self.features.hash() ^ (HIDDEN as u32 * 2)
    }

    /// A refresh cache seeded with this transformer's biases.
    pub fn new_cache(&self) -> RefreshCache {
        RefreshCache::new(&self.biases)
    }

    /// Read parameters from a little-endian stream: layout hash, weights
    /// (column-major by feature), then biases.
    ///
    /// On error the transformer's contents are unspecified; discard it.
    pub fn read_parameters<R: Read>(&mut self, reader: &mut R) -> Result<(), ParamsError> {
        let found = reader.read_u32::<LittleEndian>()?;
        let expected = self.hash_value();
        if found != expected {
            return Err(ParamsError::HashMismatch { expected, found });
        }
        for w in self.weights.iter_mut() {
            *w = reader.read_i16::<LittleEndian>()?;
        }
        for b in self.biases.iter_mut() {
            *b = reader.read_i16::<LittleEndian>()?;
        }
        debug!(
            dimensions = self.features.dimensions(),
            hidden = HIDDEN,
            "loaded transformer parameters"
        );
        Ok(())
    }

    /// Write parameters in the format [`read_parameters`](Self::read_parameters)
    /// consumes.
    pub fn write_parameters<W: Write>(&self, writer: &mut W) -> Result<(), ParamsError> {
        writer.write_u32::<LittleEndian>(self.hash_value())?;
        for &w in self.weights.iter() {
            writer.write_i16::<LittleEndian>(w)?;
        }
        for &b in self.biases.iter() {
            writer.write_i16::<LittleEndian>(b)?;
        }
        Ok(())
    }

    #[inline]
    fn column(&self, feature: u32) -> &[i16] {
        let offset = feature as usize * HIDDEN;
        &self.weights[offset..offset + HIDDEN]
    }

    /// Scratch update: bias plus the weight columns of every active feature.
    pub fn refresh(&self, chain: &mut Chain, idx: usize, persp: Color) {
        let mut presence = IndexList::new();
        let mut threats = IndexList::new();
        self.features
            .append_active_features(chain.board(idx), persp, &mut presence, &mut threats);

        let mut values = [0i16; HIDDEN];
        values.copy_from_slice(&self.biases);
        for &feature in presence.iter().chain(threats.iter()) {
            add_column(&mut values, self.column(feature));
        }

        let acc = chain.state_mut(idx).accumulator_mut();
        acc.values[persp.index()] = values;
        acc.computed[persp.index()] = true;
    }

    /// Materialize the accumulator for `persp` at position `idx`.
    ///
    /// Walks backward looking for a computed ancestor to update forward
    /// from. A missing or stale back-link, or a refresh barrier (the king
    /// changed orientation), stops the walk: the target is then rebuilt via
    /// the refresh cache and its ancestors down to the stopping point are
    /// filled backward, since the search is likely to unwind into them.
    pub fn update_accumulator(
        &self,
        chain: &mut Chain,
        idx: usize,
        persp: Color,
        cache: &mut RefreshCache,
    ) {
        if chain.state(idx).accumulator().computed(persp) {
            return;
        }

        let mut st = idx;
        let start = loop {
            let linked = chain.state(st).previous().filter(|&prev| {
                chain.state(prev).next() == Some(st)
                    && !self.features.requires_refresh(chain.state(st).dirty(), persp)
            });
            let Some(prev) = linked else {
                self.refresh_from_cache(chain, idx, persp, cache);
                if st != idx {
                    self.update_chain(chain, idx, st, persp, Direction::Backwards);
                }
                return;
            };
            if chain.state(prev).accumulator().computed(persp) {
                break prev;
            }
            st = prev;
        };

        self.update_chain(chain, start, idx, persp, Direction::Forward);
    }

    /// Step from a computed position toward `target`, updating one neighbor
    /// at a time.
    fn update_chain(
        &self,
        chain: &mut Chain,
        computed: usize,
        target: usize,
        persp: Color,
        dir: Direction,
    ) {
        let mut computed = computed;
        while computed != target {
            let next = match dir {
                Direction::Forward => chain.state(computed).next(),
                Direction::Backwards => chain.state(computed).previous(),
            }
            .expect("chain is linked between the computed position and the target");

            self.update_one(chain, computed, next, persp, dir);
            computed = next;
        }
    }

    /// Compute `next`'s accumulator from its computed neighbor.
    fn update_one(
        &self,
        chain: &mut Chain,
        computed: usize,
        next: usize,
        persp: Color,
        dir: Direction,
    ) {
        debug_assert!(chain.state(computed).accumulator().computed(persp));
        debug_assert!(!chain.state(next).accumulator().computed(persp));

        // Any king square in the updated span carries the same orientation
        // mask (a mask change is a refresh barrier), so `next`'s own king
        // anchors all indices.
        let ksq = chain.board(next).king_square(persp);

        let mut removed = IndexList::new();
        let mut added = IndexList::new();

        // Presence deltas come from the dirty record of the later position;
        // walking backwards undoes that move, so the roles swap.
        match dir {
            Direction::Forward => self.features.append_changed_presence(
                persp,
                ksq,
                chain.state(next).dirty(),
                &mut removed,
                &mut added,
            ),
            Direction::Backwards => self.features.append_changed_presence(
                persp,
                ksq,
                chain.state(computed).dirty(),
                &mut added,
                &mut removed,
            ),
        }

        // Threat deltas come from differencing the two extractions, which
        // concatenate into globally sorted lists.
        let mut old_threats = IndexList::new();
        let mut new_threats = IndexList::new();
        self.features
            .append_active_threats(chain.board(computed), persp, &mut old_threats);
        self.features
            .append_active_threats(chain.board(next), persp, &mut new_threats);
        diff_sorted(&old_threats, &new_threats, &mut removed, &mut added);

        let mut values = chain.state(computed).accumulator().values[persp.index()];
        for &feature in &added {
            add_column(&mut values, self.column(feature));
        }
        for &feature in &removed {
            sub_column(&mut values, self.column(feature));
        }

        let acc = chain.state_mut(next).accumulator_mut();
        acc.values[persp.index()] = values;
        acc.computed[persp.index()] = true;
    }

    /// Rebuild `idx`'s accumulator by patching the cache slot of its king
    /// square: presence deltas from the slot's remembered bitboards, threat
    /// deltas from its remembered threat list.
    fn refresh_from_cache(
        &self,
        chain: &mut Chain,
        idx: usize,
        persp: Color,
        cache: &mut RefreshCache,
    ) {
        let board = *chain.board(idx);
        let ksq = board.king_square(persp);

        let mut removed = IndexList::new();
        let mut added = IndexList::new();
        let mut threats = IndexList::new();
        self.features
            .append_active_threats(&board, persp, &mut threats);

        let entry = cache.entry_mut(persp, ksq);
        for color in Color::ALL {
            for kind in PieceKind::ALL {
                let piece = Piece::new(kind, color);
                let old_bb = entry.by_color[color.index()] & entry.by_kind[kind.index()];
                let new_bb = board.pieces_of(color, kind);
                for sq in old_bb & !new_bb {
                    removed.push(self.features.presence_index(persp, piece, sq, ksq));
                }
                for sq in new_bb & !old_bb {
                    added.push(self.features.presence_index(persp, piece, sq, ksq));
                }
            }
        }
        diff_sorted(&entry.threats, &threats, &mut removed, &mut added);

        for &feature in &added {
            add_column(&mut entry.accumulation, self.column(feature));
        }
        for &feature in &removed {
            sub_column(&mut entry.accumulation, self.column(feature));
        }

        for color in Color::ALL {
            entry.by_color[color.index()] = board.side(color);
        }
        for kind in PieceKind::ALL {
            entry.by_kind[kind.index()] = board.pieces(kind);
        }
        entry.threats.clear();
        entry.threats.extend_from_slice(&threats);

        let acc = chain.state_mut(idx).accumulator_mut();
        acc.values[persp.index()] = entry.accumulation;
        acc.computed[persp.index()] = true;

        debug!(
            ?persp,
            king = %ksq,
            added = added.len(),
            removed = removed.len(),
            "refreshed accumulator from cache"
        );
    }
}

#[inline]
fn add_column(values: &mut [i16; HIDDEN], column: &[i16]) {
    for (v, &w) in values.iter_mut().zip(column) {
        *v += w;
    }
}

#[inline]
fn sub_column(values: &mut [i16; HIDDEN], column: &[i16]) {
    for (v, &w) in values.iter_mut().zip(column) {
        *v -= w;
    }
}
