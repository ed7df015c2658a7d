use rustc_hash::FxHashMap;

use crate::morph::analyzer::MorphAnalyzer;

// Output order has to be deterministic, so the buckets cannot live in a plain
// hash map: lemmas and buckets sit in parallel vectors in creation order and
// the map only resolves a lemma to its slot.
pub struct LemmaGroups {
    lemmas: Vec<String>,
    buckets: Vec<Vec<u32>>,
    lemma_to_slot: FxHashMap<String, usize>,
}

impl LemmaGroups {
    pub fn new() -> Self {
        Self {
            lemmas: Vec::new(),
            buckets: Vec::new(),
            lemma_to_slot: FxHashMap::default(),
        }
    }

    /// Append a token id to its lemma's bucket, creating the bucket on first
    /// occurrence. Bucket creation order fixes the lemma's output id.
    pub fn push(&mut self, lemma: &str, token_id: u32) {
        match self.lemma_to_slot.get(lemma) {
            Some(&slot) => self.buckets[slot].push(token_id),
            None => {
                self.lemma_to_slot.insert(lemma.to_string(), self.lemmas.len());
                self.lemmas.push(lemma.to_string());
                self.buckets.push(vec![token_id]);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lemmas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lemmas.is_empty()
    }

    pub fn lemma(&self, slot: usize) -> &str {
        &self.lemmas[slot]
    }

    pub fn bucket(&self, slot: usize) -> &[u32] {
        &self.buckets[slot]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u32])> {
        self.lemmas
            .iter()
            .map(|l| l.as_str())
            .zip(self.buckets.iter().map(|b| b.as_slice()))
    }

    /// Total number of token ids across all buckets.
    pub fn member_count(&self) -> usize {
        self.buckets.iter().map(|b| b.len()).sum()
    }

    pub fn largest_bucket(&self) -> usize {
        self.buckets.iter().map(|b| b.len()).max().unwrap_or(0)
    }
}

/// Bucket every token id under the analyzer's top-ranked normal form.
///
/// Tokens are analyzed in isolation, so there is no context to disambiguate
/// with and the first candidate is always the one used.
pub fn group_by_lemma(tokens: &[String], analyzer: &MorphAnalyzer) -> LemmaGroups {
    let mut groups = LemmaGroups::new();
    for (id, token) in tokens.iter().enumerate() {
        let lemma = analyzer.normal_form(token);
        groups.push(&lemma, id as u32);
    }
    groups
}
