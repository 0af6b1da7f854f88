//! Arrangement enumeration: which series occupies which of the seven day slots.
//!
//! For a campaign type with `k` distinct rooms, the six room days take every
//! length-6 sequence over the room candidates that uses exactly `k` distinct
//! rooms. Each sequence is combined with every cellar candidate at every one
//! of the seven slot positions. For `Six` this is every permutation of six
//! distinct rooms.

use std::sync::Arc;

use radonlab_core::domain::{RoomSeries, VariationPattern, DAYS};
use radonlab_core::stats::{binomial, surjections};
use radonlab_core::CampaignType;

/// Room-day slots in a campaign.
pub const ROOM_DAYS: usize = DAYS - 1;

/// Room indices for the six room days, in visiting order (cellar not yet placed).
pub type RoomSequence = [usize; ROOM_DAYS];

/// Every room sequence over `candidates` rooms using exactly `distinct` of them,
/// in lexicographic order.
pub fn room_sequences(candidates: usize, distinct: usize) -> Vec<RoomSequence> {
    let mut out = Vec::new();
    if distinct == 0 || distinct > ROOM_DAYS || candidates < distinct {
        return out;
    }
    let mut seq = [0usize; ROOM_DAYS];
    let mut uses = vec![0usize; candidates];
    extend_sequence(0, 0, distinct, &mut seq, &mut uses, &mut out);
    out
}

fn extend_sequence(
    pos: usize,
    used: usize,
    distinct: usize,
    seq: &mut RoomSequence,
    uses: &mut [usize],
    out: &mut Vec<RoomSequence>,
) {
    if pos == ROOM_DAYS {
        if used == distinct {
            out.push(*seq);
        }
        return;
    }
    let slots_after = ROOM_DAYS - pos - 1;
    for room in 0..uses.len() {
        let used_after = used + usize::from(uses[room] == 0);
        // Too many distinct rooms, or too few slots left to reach `distinct`.
        if used_after > distinct || distinct - used_after > slots_after {
            continue;
        }
        seq[pos] = room;
        uses[room] += 1;
        extend_sequence(pos + 1, used_after, distinct, seq, uses, out);
        uses[room] -= 1;
    }
}

/// One concrete slot assignment: six room days, one cellar, and its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrangement {
    pub rooms: RoomSequence,
    pub cellar: usize,
    pub cellar_slot: usize,
}

impl Arrangement {
    /// Expand a room sequence with every cellar candidate at every slot.
    pub fn expand(rooms: RoomSequence, cellars: usize) -> impl Iterator<Item = Arrangement> {
        (0..cellars).flat_map(move |cellar| {
            (0..DAYS).map(move |cellar_slot| Arrangement {
                rooms,
                cellar,
                cellar_slot,
            })
        })
    }

    /// The seven series in slot order, cellar inserted at `cellar_slot`.
    pub fn series(
        &self,
        room_pool: &[Arc<RoomSeries>],
        cellar_pool: &[Arc<RoomSeries>],
    ) -> Vec<Arc<RoomSeries>> {
        let mut out = Vec::with_capacity(DAYS);
        let mut rooms = self.rooms.iter();
        for slot in 0..DAYS {
            if slot == self.cellar_slot {
                out.push(Arc::clone(&cellar_pool[self.cellar]));
            } else if let Some(&r) = rooms.next() {
                out.push(Arc::clone(&room_pool[r]));
            }
        }
        out
    }

    pub fn pattern(&self) -> VariationPattern {
        VariationPattern::cellar_at(self.cellar_slot)
    }
}

/// Number of room sequences for a campaign type: `C(rooms, k) * k! * S(6, k)`.
pub fn expected_sequence_count(campaign_type: CampaignType, rooms: usize) -> u128 {
    let k = campaign_type.slot_count();
    binomial(rooms as u64, k as u64).saturating_mul(surjections(ROOM_DAYS as u32, k as u32))
}

/// Closed-form population size of a sweep.
pub fn expected_campaign_count(
    campaign_type: CampaignType,
    rooms: usize,
    cellars: usize,
    offsets: usize,
) -> u128 {
    expected_sequence_count(campaign_type, rooms)
        .saturating_mul(DAYS as u128)
        .saturating_mul(cellars as u128)
        .saturating_mul(offsets as u128)
}
