//! Flat L2 nearest-neighbor index.
//!
//! Exhaustive squared-Euclidean search over the raw embedding space; no
//! normalization, no approximate structures. Built all at once from the
//! pool's embedding matrix and replaced wholesale on rebuild.

use std::cmp::Ordering;

use ndarray::{Array2, ArrayView1};

use crate::core::errors::ApiError;

#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Row index into the pool this index was built from.
    pub index: usize,
    /// Squared L2 distance to the query.
    pub distance: f32,
}

impl SearchHit {
    /// Display-only confidence in (0, 1]; not part of the retrieval
    /// contract.
    pub fn confidence(&self) -> f32 {
        1.0 / (1.0 + self.distance)
    }
}

#[derive(Debug, Clone)]
pub struct FlatL2Index {
    vectors: Array2<f32>,
}

impl FlatL2Index {
    /// Build from one vector per row. Rejects empty and ragged input.
    pub fn build(vectors: &[Vec<f32>]) -> Result<FlatL2Index, ApiError> {
        let rows = vectors.len();
        if rows == 0 {
            return Err(ApiError::BadRequest(
                "cannot build an index from zero vectors".to_string(),
            ));
        }
        let dim = vectors[0].len();
        if dim == 0 {
            return Err(ApiError::BadRequest(
                "cannot build an index from empty vectors".to_string(),
            ));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(ApiError::BadRequest(format!(
                "ragged embedding input: expected dimension {}, found {}",
                dim,
                bad.len()
            )));
        }

        let flat: Vec<f32> = vectors.iter().flatten().copied().collect();
        let vectors = Array2::from_shape_vec((rows, dim), flat).map_err(ApiError::internal)?;

        Ok(FlatL2Index { vectors })
    }

    pub fn len(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.nrows() == 0
    }

    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    /// Return the `k` nearest rows to `query`, closest first. `k` is
    /// clamped to the row count; asking for more neighbors than exist is
    /// not an error.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, ApiError> {
        if query.len() != self.dim() {
            return Err(ApiError::BadRequest(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dim()
            )));
        }

        let k = k.min(self.len());
        let query = ArrayView1::from(query);

        let mut hits: Vec<SearchHit> = self
            .vectors
            .rows()
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                let diff = &row - &query;
                let distance = diff.mapv(|x| x * x).sum();
                SearchHit { index, distance }
            })
            .collect();

        hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
        hits.truncate(k);

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> FlatL2Index {
        FlatL2Index::build(&[
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 3.0],
            vec![2.0, 2.0],
        ])
        .expect("build")
    }

    #[test]
    fn nearest_neighbors_come_back_closest_first() {
        let hits = index().search(&[0.9, 0.1], 2).expect("search");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].index, 1);
        assert_eq!(hits[1].index, 0);
        assert!(hits[0].distance < hits[1].distance);
    }

    #[test]
    fn k_is_clamped_to_pool_size() {
        let hits = index().search(&[0.0, 0.0], 100).expect("search");
        assert_eq!(hits.len(), 4);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let err = index().search(&[0.0, 0.0, 0.0], 1).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn empty_build_is_rejected() {
        assert!(FlatL2Index::build(&[]).is_err());
    }

    #[test]
    fn ragged_build_is_rejected() {
        assert!(FlatL2Index::build(&[vec![1.0, 2.0], vec![1.0]]).is_err());
    }

    #[test]
    fn confidence_decreases_with_distance() {
        let exact = SearchHit {
            index: 0,
            distance: 0.0,
        };
        let far = SearchHit {
            index: 1,
            distance: 9.0,
        };
        assert_eq!(exact.confidence(), 1.0);
        assert!(far.confidence() < exact.confidence());
        assert!((far.confidence() - 0.1).abs() < 1e-6);
    }
}
