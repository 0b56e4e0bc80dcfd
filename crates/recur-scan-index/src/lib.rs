//! Exact nearest-neighbor search over flat f32 vectors.
//!
//! The detector only needs one operation from a vector index: given a batch
//! of query vectors, return each query's distance to its best match in the
//! reference set. A brute-force scan keeps that contract exact and is fast
//! enough for per-season corpora; batches are parallelized across queries
//! since the index is read-only once built.

use rayon::prelude::*;

use recur_scan_types::{EpisodeVectors, ScanError, ScanResult};

/// Flat squared-L2 index: stores reference vectors row-major and answers
/// k=1 queries with the squared Euclidean distance to the closest row.
#[derive(Debug, Default)]
pub struct FlatL2Index {
    dim: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of reference vectors stored.
    pub fn len(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Appends row-major reference vectors.
    pub fn add(&mut self, rows: &[f32]) -> ScanResult<()> {
        if self.dim == 0 || rows.len() % self.dim != 0 {
            return Err(ScanError::invalid_data(format!(
                "cannot add {} values to a dimension-{} index",
                rows.len(),
                self.dim
            )));
        }
        self.data.extend_from_slice(rows);
        Ok(())
    }

    pub fn add_vectors(&mut self, vectors: &EpisodeVectors) -> ScanResult<()> {
        if vectors.dim() != self.dim {
            return Err(ScanError::invalid_data(format!(
                "cannot add dimension-{} vectors to a dimension-{} index",
                vectors.dim(),
                self.dim
            )));
        }
        self.add(vectors.data())
    }

    /// Squared L2 distance to the nearest reference vector, or `None` when
    /// the index holds no vectors.
    pub fn nearest(&self, query: &[f32]) -> Option<f32> {
        debug_assert_eq!(query.len(), self.dim);
        self.data
            .chunks_exact(self.dim)
            .map(|row| squared_l2(query, row))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Batch k=1 search over row-major queries, parallel across queries.
    pub fn search(&self, queries: &EpisodeVectors) -> ScanResult<Vec<f32>> {
        if queries.dim() != self.dim {
            return Err(ScanError::invalid_data(format!(
                "query dimension {} does not match index dimension {}",
                queries.dim(),
                self.dim
            )));
        }
        if self.is_empty() {
            return Err(ScanError::invalid_data(
                "search against an empty reference set",
            ));
        }
        let distances = queries
            .data()
            .par_chunks_exact(self.dim)
            .map(|query| {
                self.nearest(query)
                    .expect("non-empty index always yields a nearest distance")
            })
            .collect();
        Ok(distances)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectors(dim: usize, data: &[f32]) -> EpisodeVectors {
        EpisodeVectors::from_owned(dim, data.to_vec()).unwrap()
    }

    #[test]
    fn nearest_returns_squared_distance() {
        let mut index = FlatL2Index::new(2);
        index.add(&[0.0, 0.0, 3.0, 4.0]).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.nearest(&[3.0, 0.0]), Some(9.0));
        assert_eq!(index.nearest(&[3.0, 4.0]), Some(0.0));
    }

    #[test]
    fn empty_index_has_no_nearest() {
        let index = FlatL2Index::new(4);
        assert_eq!(index.nearest(&[0.0; 4]), None);
        assert!(index.search(&vectors(4, &[0.0; 4])).is_err());
    }

    #[test]
    fn add_rejects_wrong_dimension() {
        let mut index = FlatL2Index::new(3);
        assert!(index.add(&[1.0, 2.0]).is_err());
        assert!(index.add_vectors(&vectors(2, &[1.0, 2.0])).is_err());
    }

    #[test]
    fn search_rejects_mismatched_queries() {
        let mut index = FlatL2Index::new(3);
        index.add(&[0.0; 3]).unwrap();
        assert!(index.search(&vectors(2, &[0.0; 2])).is_err());
    }

    #[test]
    fn batch_search_matches_serial_queries() {
        let mut index = FlatL2Index::new(2);
        index
            .add(&[0.0, 0.0, 1.0, 1.0, 5.0, 5.0, -2.0, 3.0])
            .unwrap();
        let queries = vectors(2, &[0.5, 0.5, 4.0, 4.5, -1.0, 2.0, 10.0, 10.0]);
        let batch = index.search(&queries).unwrap();
        assert_eq!(batch.len(), queries.len());
        for (i, distance) in batch.iter().enumerate() {
            assert_eq!(Some(*distance), index.nearest(queries.row(i)));
        }
    }
}
