//! Position mapping across applied steps.
//!
//! A [`StepMap`] describes how one step moved positions around. A
//! [`Mapping`] chains step maps and remembers which maps undo each other, so
//! that positions inside deleted content survive a round trip through a
//! change and its inverse.

/// Which side a position sticks to when content is inserted or replaced
/// exactly at it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Assoc {
    /// Stay before content inserted at the position.
    Before,
    /// Move after content inserted at the position.
    #[default]
    After,
}

const DEL_BEFORE: u8 = 1;
const DEL_AFTER: u8 = 2;
const DEL_ACROSS: u8 = 4;
const DEL_SIDE: u8 = 8;

/// Where in a step map a mapped position came from: the range index and the
/// offset into that range. Used to map back through a mirroring map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recover {
    index: usize,
    offset: usize,
}

/// The outcome of mapping a single position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
    pub pos: usize,
    del_info: u8,
    pub recover: Option<Recover>,
}

impl MapResult {
    /// The content on the side the position is associated with was deleted.
    pub fn deleted(&self) -> bool {
        self.del_info & DEL_SIDE > 0
    }

    /// The content directly before the position was deleted.
    pub fn deleted_before(&self) -> bool {
        self.del_info & (DEL_BEFORE | DEL_ACROSS) > 0
    }

    /// The content directly after the position was deleted.
    pub fn deleted_after(&self) -> bool {
        self.del_info & (DEL_AFTER | DEL_ACROSS) > 0
    }

    /// The position was strictly inside a deleted range.
    pub fn deleted_across(&self) -> bool {
        self.del_info & DEL_ACROSS > 0
    }
}

/// Anything positions can be mapped through.
pub trait Mappable {
    fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult;

    fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }
}

/// A changed range: `old_size` positions at `start` were replaced by
/// `new_size` positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapRange {
    pub start: usize,
    pub old_size: usize,
    pub new_size: usize,
}

/// The position map of one step: an ordered list of changed ranges. Positions
/// outside the ranges shift by the accumulated size difference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepMap {
    ranges: Vec<MapRange>,
    inverted: bool,
}

impl StepMap {
    pub fn new(ranges: Vec<MapRange>) -> Self {
        Self {
            ranges,
            inverted: false,
        }
    }

    /// A map that leaves every position in place.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Map for replacing `from..to` with `size` positions of new content.
    pub fn replace(from: usize, to: usize, size: usize) -> Self {
        if from == to && size == 0 {
            return Self::identity();
        }
        Self::new(vec![MapRange {
            start: from,
            old_size: to - from,
            new_size: size,
        }])
    }

    pub fn ranges(&self) -> &[MapRange] {
        &self.ranges
    }

    pub fn is_identity(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The map that undoes this one.
    pub fn invert(&self) -> StepMap {
        Self {
            ranges: self.ranges.clone(),
            inverted: !self.inverted,
        }
    }

    fn sizes(&self, range: &MapRange) -> (usize, usize) {
        if self.inverted {
            (range.new_size, range.old_size)
        } else {
            (range.old_size, range.new_size)
        }
    }

    /// Map a recover value produced by the mirror of this map back to a
    /// position.
    pub fn recover(&self, recover: Recover) -> usize {
        let mut diff: isize = 0;
        if !self.inverted {
            for range in self.ranges.iter().take(recover.index) {
                diff += range.new_size as isize - range.old_size as isize;
            }
        }
        let start = self.ranges.get(recover.index).map_or(0, |r| r.start);
        offset(start, diff) + recover.offset
    }

    /// Call `f` with `(old_start, old_end, new_start, new_end)` for every
    /// changed range.
    pub fn for_each(&self, mut f: impl FnMut(usize, usize, usize, usize)) {
        let mut diff: isize = 0;
        for range in &self.ranges {
            let (old_size, new_size) = self.sizes(range);
            let start = offset(range.start, if self.inverted { -diff } else { 0 });
            let new_start = offset(start, diff);
            f(start, start + old_size, new_start, new_start + new_size);
            diff += new_size as isize - old_size as isize;
        }
    }
}

fn offset(pos: usize, diff: isize) -> usize {
    pos.checked_add_signed(diff).unwrap_or(0)
}

impl Mappable for StepMap {
    fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut diff: isize = 0;
        for (index, range) in self.ranges.iter().enumerate() {
            let start = offset(range.start, if self.inverted { -diff } else { 0 });
            if start > pos {
                break;
            }
            let (old_size, new_size) = self.sizes(range);
            let end = start + old_size;
            if pos <= end {
                let after = if old_size == 0 {
                    assoc == Assoc::After
                } else if pos == start {
                    false
                } else if pos == end {
                    true
                } else {
                    assoc == Assoc::After
                };
                let result = offset(start, diff) + if after { new_size } else { 0 };
                let sticks_to = if assoc == Assoc::Before { start } else { end };
                let recover = (pos != sticks_to).then_some(Recover {
                    index,
                    offset: pos - start,
                });
                let mut del_info = if pos == start {
                    DEL_AFTER
                } else if pos == end {
                    DEL_BEFORE
                } else {
                    DEL_ACROSS
                };
                if pos != sticks_to {
                    del_info |= DEL_SIDE;
                }
                return MapResult {
                    pos: result,
                    del_info,
                    recover,
                };
            }
            diff += new_size as isize - old_size as isize;
        }
        MapResult {
            pos: offset(pos, diff),
            del_info: 0,
            recover: None,
        }
    }
}

/// A chain of step maps, optionally with mirror links between a map and the
/// map of the step that undoes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
    mirror: Vec<(usize, usize)>,
    from: usize,
    to: usize,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_maps(maps: Vec<StepMap>) -> Self {
        let to = maps.len();
        Self {
            maps,
            mirror: Vec::new(),
            from: 0,
            to,
        }
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A mapping covering only the maps in `from..to`.
    pub fn slice(&self, from: usize, to: usize) -> Mapping {
        Mapping {
            maps: self.maps.clone(),
            mirror: self.mirror.clone(),
            from: self.from + from,
            to: (self.from + to).min(self.to),
        }
    }

    /// Append a map. `mirrors` names an earlier map this one undoes.
    pub fn append_map(&mut self, map: StepMap, mirrors: Option<usize>) {
        self.maps.truncate(self.to);
        self.maps.push(map);
        self.to = self.maps.len();
        if let Some(m) = mirrors {
            self.set_mirror(self.to - 1, m);
        }
    }

    pub fn append_mapping(&mut self, mapping: &Mapping) {
        let start_size = self.maps.len();
        for i in mapping.from..mapping.to {
            let mirror = mapping
                .get_mirror(i)
                .filter(|&m| m < i && m >= mapping.from)
                .map(|m| start_size + m - mapping.from);
            self.append_map(mapping.maps[i].clone(), mirror);
        }
    }

    /// Append the inverse of every map in `mapping`, newest first, keeping
    /// mirror links.
    pub fn append_mapping_inverted(&mut self, mapping: &Mapping) {
        let total = self.maps.len() + mapping.len();
        for i in (mapping.from..mapping.to).rev() {
            let mirror = mapping
                .get_mirror(i)
                .filter(|&m| m > i && m < mapping.to)
                .map(|m| total - (m - mapping.from) - 1);
            self.append_map(mapping.maps[i].invert(), mirror);
        }
    }

    pub fn invert(&self) -> Mapping {
        let mut inverse = Mapping::new();
        inverse.append_mapping_inverted(self);
        inverse
    }

    pub fn get_mirror(&self, n: usize) -> Option<usize> {
        self.mirror.iter().find_map(|&(a, b)| {
            if a == n {
                Some(b)
            } else if b == n {
                Some(a)
            } else {
                None
            }
        })
    }

    pub fn set_mirror(&mut self, n: usize, m: usize) {
        self.mirror.push((n, m));
    }
}

impl Mappable for Mapping {
    fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut pos = pos;
        let mut del_info = 0;
        let mut i = self.from;
        while i < self.to {
            let result = self.maps[i].map_result(pos, assoc);
            if let Some(recover) = result.recover {
                if let Some(corr) = self.get_mirror(i).filter(|&c| c > i && c < self.to) {
                    i = corr + 1;
                    pos = self.maps[corr].recover(recover);
                    continue;
                }
            }
            del_info |= result.del_info;
            pos = result.pos;
            i += 1;
        }
        MapResult {
            pos,
            del_info,
            recover: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // replace 2..5 with 1 position
    fn shrink() -> StepMap {
        StepMap::replace(2, 5, 1)
    }

    #[rstest]
    #[case(0, Assoc::After, 0)]
    #[case(2, Assoc::After, 2)]
    #[case(3, Assoc::After, 3)]
    #[case(3, Assoc::Before, 2)]
    #[case(5, Assoc::Before, 3)]
    #[case(6, Assoc::After, 4)]
    fn maps_through_replace(#[case] pos: usize, #[case] assoc: Assoc, #[case] expected: usize) {
        assert_eq!(shrink().map(pos, assoc), expected);
    }

    #[test]
    fn insertion_respects_assoc() {
        let insert = StepMap::replace(4, 4, 3);
        assert_eq!(insert.map(4, Assoc::After), 7);
        assert_eq!(insert.map(4, Assoc::Before), 4);
        assert_eq!(insert.map(5, Assoc::Before), 8);
    }

    #[test]
    fn deleted_flags() {
        let result = shrink().map_result(3, Assoc::After);
        assert!(result.deleted());
        assert!(result.deleted_across());
        let result = shrink().map_result(2, Assoc::After);
        assert!(result.deleted());
        assert!(result.deleted_after());
        assert!(!result.deleted_before());
        assert!(!shrink().map_result(2, Assoc::Before).deleted());
    }

    #[test]
    fn inverted_map_undoes() {
        let map = StepMap::replace(2, 2, 4);
        let inv = map.invert();
        for pos in [0, 1, 2, 8] {
            assert_eq!(inv.map(map.map(pos, Assoc::After), Assoc::After), pos);
        }
        assert_eq!(inv.map(4, Assoc::After), 2);
    }

    #[test]
    fn mirrored_mapping_recovers_deleted_positions() {
        let delete = StepMap::replace(2, 6, 0);
        let mut mapping = Mapping::new();
        mapping.append_map(delete.clone(), None);
        mapping.append_map(delete.invert(), Some(0));
        for pos in 0..10 {
            assert_eq!(mapping.map(pos, Assoc::After), pos, "pos {pos}");
        }
    }

    #[test]
    fn inverted_mapping_round_trips() {
        let mut forward = Mapping::new();
        forward.append_map(StepMap::replace(1, 3, 0), None);
        forward.append_map(StepMap::replace(4, 4, 2), None);
        let mut round = forward.clone();
        let n = forward.len();
        for (i, map) in forward.maps().iter().enumerate().rev() {
            round.append_map(map.invert(), Some(i));
        }
        assert_eq!(round.len(), 2 * n);
        for pos in 0..8 {
            assert_eq!(round.map(pos, Assoc::After), pos, "pos {pos}");
        }
    }

    #[test]
    fn for_each_reports_ranges() {
        let mut seen = Vec::new();
        StepMap::new(vec![
            MapRange { start: 1, old_size: 2, new_size: 0 },
            MapRange { start: 5, old_size: 0, new_size: 3 },
        ])
        .for_each(|a, b, c, d| seen.push((a, b, c, d)));
        assert_eq!(seen, vec![(1, 3, 1, 1), (5, 5, 3, 6)]);
    }
}
