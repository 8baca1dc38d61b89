use half::f16;

use super::error::EmbeddingError;

/// Row-major `rows × dim` matrix of half-precision embeddings.
///
/// Row `i` is the embedding of sentence `i` of the text it was built from. Row norms are
/// precomputed once so pairwise cosine is a single dot product per pair.
#[derive(Clone)]
pub struct EmbeddingMatrix {
    dim: usize,
    rows: usize,
    data: Vec<f16>,
    norms: Vec<f32>,
}

impl std::fmt::Debug for EmbeddingMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingMatrix")
            .field("rows", &self.rows)
            .field("dim", &self.dim)
            .finish()
    }
}

impl EmbeddingMatrix {
    /// Creates a matrix with no rows.
    pub fn empty(dim: usize) -> Self {
        Self {
            dim,
            rows: 0,
            data: Vec::new(),
            norms: Vec::new(),
        }
    }

    /// Packs provider output into a matrix, checking every row has `dim` values.
    pub fn from_rows(rows: Vec<Vec<f32>>, dim: usize) -> Result<Self, EmbeddingError> {
        let mut data = Vec::with_capacity(rows.len() * dim);
        let mut norms = Vec::with_capacity(rows.len());

        for row in &rows {
            if row.len() != dim {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
            let start = data.len();
            data.extend(row.iter().map(|&v| f16::from_f32(v)));
            norms.push(dot(&data[start..], &data[start..]).sqrt());
        }

        Ok(Self {
            dim,
            rows: rows.len(),
            data,
            norms,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Row `i` as stored.
    pub fn row(&self, i: usize) -> &[f16] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Cosine similarity between row `i` of `self` and row `j` of `other`.
    ///
    /// Accumulates in `f32` in index order, so the result is reproducible for the same
    /// inputs. Zero-norm rows score 0.
    pub fn cosine(&self, i: usize, other: &EmbeddingMatrix, j: usize) -> f32 {
        let denom = self.norms[i] * other.norms[j];
        if denom <= f32::EPSILON {
            return 0.0;
        }
        dot(self.row(i), other.row(j)) / denom
    }

    /// Bytes held by the embedding data.
    pub fn memory_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<f16>() + self.norms.len() * std::mem::size_of::<f32>()
    }
}

fn dot(a: &[f16], b: &[f16]) -> f32 {
    let mut sum = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        sum += x.to_f32() * y.to_f32();
    }
    sum
}
