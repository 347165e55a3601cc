use crate::generation::ChunkType;
use crate::segment::Segment;

/// Active segments ordered by index
#[derive(Debug, Default)]
pub struct SegmentStore {
    segments: Vec<Segment>,
}

impl SegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Segment> {
        self.segments.iter_mut()
    }

    pub fn first(&self) -> Option<&Segment> {
        self.segments.first()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    fn position(&self, index: i64) -> Result<usize, usize> {
        self.segments.binary_search_by_key(&index, |s| s.index)
    }

    pub fn get(&self, index: i64) -> Option<&Segment> {
        self.position(index).ok().map(|i| &self.segments[i])
    }

    pub fn contains_index(&self, index: i64) -> bool {
        self.position(index).is_ok()
    }

    /// Segment owning `x` under half-open ownership
    pub fn covering(&self, x: f64) -> Option<&Segment> {
        let after = self.segments.partition_point(|s| s.start_x <= x);
        after
            .checked_sub(1)
            .map(|i| &self.segments[i])
            .filter(|s| s.contains(x))
    }

    /// Segment owning `x`, or failing that the one whose end seam is `x`
    pub fn touching(&self, x: f64) -> Option<&Segment> {
        self.covering(x)
            .or_else(|| self.segments.iter().rev().find(|s| s.touches(x)))
    }

    /// Insert keeping index order; a segment whose index is already present
    /// is handed back
    pub fn insert(&mut self, segment: Segment) -> Result<(), Segment> {
        match self.position(segment.index) {
            Ok(_) => Err(segment),
            Err(at) => {
                self.segments.insert(at, segment);
                Ok(())
            }
        }
    }

    /// Insert keeping index order without rejecting duplicates.
    ///
    /// A duplicate lands after the existing entries for its index, so
    /// `dedupe` keeps the earlier one.
    pub fn append(&mut self, segment: Segment) {
        let at = self.segments.partition_point(|s| s.index <= segment.index);
        self.segments.insert(at, segment);
    }

    /// Remove later segments sharing an index with an earlier one
    pub fn dedupe(&mut self) -> Vec<Segment> {
        let mut removed = Vec::new();
        let mut kept: Vec<Segment> = Vec::with_capacity(self.segments.len());
        for segment in self.segments.drain(..) {
            match kept.last() {
                Some(previous) if previous.index == segment.index => removed.push(segment),
                _ => kept.push(segment),
            }
        }
        self.segments = kept;
        removed
    }

    pub fn remove(&mut self, index: i64) -> Option<Segment> {
        self.position(index).ok().map(|i| self.segments.remove(i))
    }

    pub fn pop_first(&mut self) -> Option<Segment> {
        if self.segments.is_empty() {
            None
        } else {
            Some(self.segments.remove(0))
        }
    }

    pub fn drain_all(&mut self) -> Vec<Segment> {
        std::mem::take(&mut self.segments)
    }

    pub fn indices(&self) -> Vec<i64> {
        self.segments.iter().map(|s| s.index).collect()
    }

    pub fn chunk_types(&self) -> Vec<(i64, ChunkType)> {
        self.segments.iter().map(|s| (s.index, s.chunk_type)).collect()
    }

    /// True when no two segments overlap under half-open ownership
    pub fn is_disjoint(&self) -> bool {
        self.segments
            .windows(2)
            .all(|pair| pair[0].end_x() <= pair[1].start_x + 1e-9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::LodLevel;

    fn stub(index: i64) -> Segment {
        Segment {
            index,
            start_x: index as f64 * 40.0,
            width: 40.0,
            chunk_type: ChunkType::Hills,
            difficulty: 0.0,
            points: Vec::new(),
            gap: None,
            mesh_handles: Vec::new(),
            body_handles: Vec::new(),
            decorations: Vec::new(),
            lod: LodLevel::High,
            bodies_sleeping: false,
        }
    }

    #[test]
    fn test_insert_keeps_order_and_rejects_duplicates() {
        let mut store = SegmentStore::new();
        for index in [3, 1, 2] {
            assert!(store.insert(stub(index)).is_ok());
        }
        assert_eq!(store.indices(), vec![1, 2, 3]);
        assert!(store.insert(stub(2)).is_err());
        assert!(store.is_disjoint());
    }

    #[test]
    fn test_covering_is_half_open() {
        let mut store = SegmentStore::new();
        store.insert(stub(0)).unwrap();
        store.insert(stub(1)).unwrap();
        assert_eq!(store.covering(0.0).map(|s| s.index), Some(0));
        assert_eq!(store.covering(39.999).map(|s| s.index), Some(0));
        assert_eq!(store.covering(40.0).map(|s| s.index), Some(1));
        assert!(store.covering(80.0).is_none());
        assert!(store.covering(-0.1).is_none());
        assert_eq!(store.touching(80.0).map(|s| s.index), Some(1));
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let mut store = SegmentStore::new();
        store.append(stub(0));
        let mut duplicate = stub(0);
        duplicate.chunk_type = ChunkType::Plateau;
        store.append(duplicate);
        store.append(stub(1));

        let removed = store.dedupe();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].chunk_type, ChunkType::Plateau);
        assert_eq!(store.indices(), vec![0, 1]);
        assert_eq!(store.get(0).map(|s| s.chunk_type), Some(ChunkType::Hills));
    }

    #[test]
    fn test_remove_and_pop() {
        let mut store = SegmentStore::new();
        for index in 0..4 {
            store.insert(stub(index)).unwrap();
        }
        assert_eq!(store.remove(2).map(|s| s.index), Some(2));
        assert!(store.remove(2).is_none());
        assert_eq!(store.pop_first().map(|s| s.index), Some(0));
        assert_eq!(store.indices(), vec![1, 3]);
    }
}
