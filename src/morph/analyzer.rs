use std::{
    fs::File,
    io::{self, BufRead, BufReader, Error, ErrorKind},
    path::Path,
};

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// One candidate analysis of a surface form.
#[derive(Debug, Clone)]
pub struct Parse {
    pub normal_form: String,
    pub score: f32,
}

// a guessed stem this short is more likely noise than a word
const MIN_STEM_CHARS: usize = 2;

const GUESS_SCORE: f32 = 0.5;

// Inflectional endings tried in order against out-of-dictionary tokens,
// longest first so `sses` wins over `s`. Each entry maps an ending to its
// replacement in the normal form.
static GUESS_RULES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("sses", "ss"),
        ("ches", "ch"),
        ("shes", "sh"),
        ("ies", "y"),
        ("ing", ""),
        ("ed", ""),
        ("s", ""),
    ]
});

/// Morphological analyzer backed by a surface-form dictionary.
///
/// Built once per run and shared by reference; every lookup after
/// construction is a read. `parse` is total: a token the dictionary does not
/// know falls through to the suffix guess rules, and a token no rule matches
/// analyzes to itself.
#[derive(Debug, Clone)]
pub struct MorphAnalyzer {
    dictionary: FxHashMap<String, Vec<Parse>>,
}

impl MorphAnalyzer {
    /// Load a tab-separated dictionary: `surface<TAB>lemma[<TAB>score]`,
    /// one candidate per line. Blank lines and `#` comments are skipped.
    pub fn from_dictionary_path<P: AsRef<Path>>(path: P) -> io::Result<MorphAnalyzer> {
        let file = File::open(path)?;
        Self::from_dictionary_reader(BufReader::new(file))
    }

    pub fn from_dictionary_reader<R: BufRead>(reader: R) -> io::Result<MorphAnalyzer> {
        let mut dictionary: FxHashMap<String, Vec<Parse>> = FxHashMap::default();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split('\t');
            let (Some(surface), Some(lemma)) = (fields.next(), fields.next()) else {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("dictionary line {}: expected <surface>\\t<lemma>", i + 1),
                ));
            };
            let score = match fields.next() {
                Some(field) => field.parse::<f32>().map_err(|e| {
                    Error::new(
                        ErrorKind::InvalidData,
                        format!("dictionary line {}: bad score {:?}: {}", i + 1, field, e),
                    )
                })?,
                None => 1.0,
            };

            dictionary
                .entry(surface.to_string())
                .or_default()
                .push(Parse {
                    normal_form: lemma.to_string(),
                    score,
                });
        }

        // rank candidates best first; stable sort keeps file order on ties
        for parses in dictionary.values_mut() {
            parses.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        Ok(MorphAnalyzer { dictionary })
    }

    /// Ranked candidate analyses for `token`. Never empty.
    pub fn parse(&self, token: &str) -> Vec<Parse> {
        if let Some(parses) = self.dictionary.get(token) {
            return parses.clone();
        }

        let mut guesses = Vec::new();
        for (suffix, replacement) in GUESS_RULES.iter() {
            if let Some(stem) = token.strip_suffix(suffix) {
                if stem.chars().count() >= MIN_STEM_CHARS {
                    guesses.push(Parse {
                        normal_form: format!("{}{}", stem, replacement),
                        score: GUESS_SCORE,
                    });
                }
            }
        }
        if guesses.is_empty() {
            guesses.push(Parse {
                normal_form: token.to_string(),
                score: 0.0,
            });
        }
        guesses
    }

    /// Top-ranked normal form, the only candidate the pipeline consumes.
    pub fn normal_form(&self, token: &str) -> String {
        match self.parse(token).into_iter().next() {
            Some(parse) => parse.normal_form,
            None => token.to_string(),
        }
    }
}
