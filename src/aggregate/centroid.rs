use crate::{embeddings::vector_loader::EmbeddingTable, morph::grouper::LemmaGroups};

/// Averaged vectors, one row per distinct lemma.
///
/// Lemma ids follow bucket-creation order, so row `i` belongs to the `i`th
/// lemma the grouper encountered.
pub struct LemmaVectors {
    dim: usize,
    data: Vec<f64>,
    id_to_lemma: Vec<String>,
}

impl LemmaVectors {
    pub fn from_rows(id_to_lemma: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        let dim = rows.first().map(|r| r.len()).unwrap_or(0);
        let data = rows.into_iter().flatten().collect();
        Self {
            dim,
            data,
            id_to_lemma,
        }
    }

    pub fn len(&self) -> usize {
        self.id_to_lemma.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_lemma.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn row(&self, id: u32) -> &[f64] {
        let start = id as usize * self.dim;
        &self.data[start..start + self.dim]
    }

    pub fn lemma(&self, id: u32) -> &str {
        &self.id_to_lemma[id as usize]
    }

    pub fn lemmas(&self) -> &[String] {
        &self.id_to_lemma
    }
}

/// Compute the unweighted centroid of every lemma bucket.
///
/// centroid = (v_1 + v_2 + ... + v_k) / k
///
/// Sums accumulate in the same `f64` precision the vectors were loaded in,
/// every member counts equally regardless of corpus frequency, and the
/// result is not renormalized. A singleton bucket reproduces its member
/// vector exactly.
pub fn average_groups(table: &EmbeddingTable, groups: &LemmaGroups) -> LemmaVectors {
    let dim = table.dim();
    let mut data: Vec<f64> = Vec::with_capacity(groups.len() * dim);
    let mut id_to_lemma: Vec<String> = Vec::with_capacity(groups.len());

    for (lemma, bucket) in groups.iter() {
        let row_start = data.len();
        data.resize(row_start + dim, 0.0);
        for &token_id in bucket {
            for (acc, value) in data[row_start..].iter_mut().zip(table.row(token_id)) {
                *acc += value;
            }
        }
        let count = bucket.len() as f64;
        for acc in &mut data[row_start..] {
            *acc /= count;
        }
        id_to_lemma.push(lemma.to_string());
    }

    LemmaVectors {
        dim,
        data,
        id_to_lemma,
    }
}
