use std::{
    io::{self, Error, ErrorKind},
    path::Path,
};

use crate::{
    aggregate::centroid::{self, LemmaVectors},
    embeddings::{vector_loader, vector_loader::EmbeddingTable, vector_writer},
    morph::{
        analyzer::MorphAnalyzer,
        grouper::{self, LemmaGroups},
    },
};

#[derive(Debug, Clone)]
pub struct PipelineStats {
    pub vocabulary_size: usize,
    pub dimensionality: usize,
    pub distinct_lemmas: usize,
    pub largest_group: usize,
}

/// One lemmatization run: load the vector file, bucket tokens by lemma,
/// average each bucket, write the result.
///
/// The analyzer is built once here and reused for every lookup. Stages run
/// strictly in order and each keeps its output in memory for the next; a
/// stage invoked before its predecessor is an error, not a resume point.
pub struct LemmaPipeline {
    analyzer: MorphAnalyzer,
    vectors_path: String,
    output_path: String,
    max_vocab: Option<usize>,
    write_header: bool,
    table: Option<EmbeddingTable>,
    groups: Option<LemmaGroups>,
    lemma_vectors: Option<LemmaVectors>,
}

impl LemmaPipeline {
    pub fn new(
        vectors_path: String,
        dictionary_path: String,
        output_path: String,
        max_vocab: Option<usize>,
        write_header: bool,
    ) -> Result<Self, Error> {
        let path = Path::new(&vectors_path);
        if !path.exists() || !path.is_file() {
            return Err(Error::new(
                ErrorKind::Other,
                "vector file path does not exist, please check the configuration",
            ));
        }
        let analyzer = MorphAnalyzer::from_dictionary_path(&dictionary_path)?;
        Ok(Self {
            analyzer,
            vectors_path,
            output_path,
            max_vocab,
            write_header,
            table: None,
            groups: None,
            lemma_vectors: None,
        })
    }

    pub fn load(&mut self) -> io::Result<()> {
        let table = vector_loader::load_vectors_from_path(&self.vectors_path, self.max_vocab)?;
        println!(
            "loaded {} tokens of dimensionality {}",
            table.len(),
            table.dim()
        );
        self.table = Some(table);
        // downstream stages are stale now
        self.groups = None;
        self.lemma_vectors = None;
        Ok(())
    }

    pub fn group(&mut self) -> io::Result<()> {
        let Some(table) = &self.table else {
            return Err(Error::new(ErrorKind::Other, "vectors have not been loaded"));
        };
        let groups = grouper::group_by_lemma(table.tokens(), &self.analyzer);
        println!(
            "grouped {} tokens under {} distinct lemmas",
            table.len(),
            groups.len()
        );
        self.groups = Some(groups);
        self.lemma_vectors = None;
        Ok(())
    }

    pub fn average(&mut self) -> io::Result<()> {
        let (Some(table), Some(groups)) = (&self.table, &self.groups) else {
            return Err(Error::new(ErrorKind::Other, "tokens have not been grouped"));
        };
        self.lemma_vectors = Some(centroid::average_groups(table, groups));
        Ok(())
    }

    pub fn write(&mut self) -> io::Result<()> {
        let Some(lemma_vectors) = &self.lemma_vectors else {
            return Err(Error::new(
                ErrorKind::Other,
                "lemma vectors have not been averaged",
            ));
        };
        vector_writer::write_vectors_to_path(&self.output_path, lemma_vectors, self.write_header)?;
        println!(
            "wrote {} lemma vectors to {}",
            lemma_vectors.len(),
            self.output_path
        );
        Ok(())
    }

    /// The batch entry point: all four stages in order.
    pub fn run(&mut self) -> io::Result<()> {
        self.load()?;
        self.group()?;
        self.average()?;
        self.write()?;
        Ok(())
    }

    pub fn stats(&self) -> Option<PipelineStats> {
        let table = self.table.as_ref()?;
        let (distinct_lemmas, largest_group) = match &self.groups {
            Some(groups) => (groups.len(), groups.largest_bucket()),
            None => (0, 0),
        };
        Some(PipelineStats {
            vocabulary_size: table.len(),
            dimensionality: table.dim(),
            distinct_lemmas,
            largest_group,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const VECTORS: &str = "3 2\ncats 1.0 0.0\ncat 0.0 1.0\ndog 2.0 2.0\n";
    const DICTIONARY: &str = "cats\tcat\ncat\tcat\ndog\tdog\n";

    fn write_fixtures(dir: &Path) -> (String, String, String) {
        let vectors_path = dir.join("wiki.vec");
        let dictionary_path = dir.join("dictionary.tsv");
        let output_path = dir.join("wiki_lemmatized.vec");
        fs::write(&vectors_path, VECTORS).unwrap();
        fs::write(&dictionary_path, DICTIONARY).unwrap();
        (
            vectors_path.to_str().unwrap().to_string(),
            dictionary_path.to_str().unwrap().to_string(),
            output_path.to_str().unwrap().to_string(),
        )
    }

    fn parse_output(path: &str) -> Vec<(String, Vec<f64>)> {
        let contents = fs::read_to_string(path).unwrap();
        contents
            .lines()
            .map(|line| {
                let (lemma, rest) = line.split_once(' ').unwrap();
                let components = rest
                    .split_whitespace()
                    .map(|c| c.parse().unwrap())
                    .collect();
                (lemma.to_string(), components)
            })
            .collect()
    }

    #[test]
    fn test_full_run_averages_shared_lemmas() {
        let dir = tempfile::tempdir().unwrap();
        let (vectors_path, dictionary_path, output_path) = write_fixtures(dir.path());

        let mut pipeline =
            LemmaPipeline::new(vectors_path, dictionary_path, output_path.clone(), None, false)
                .unwrap();
        pipeline.run().unwrap();

        let output = parse_output(&output_path);
        assert_eq!(output.len(), 2);
        assert_eq!(output[0], ("cat".to_string(), vec![0.5, 0.5]));
        assert_eq!(output[1], ("dog".to_string(), vec![2.0, 2.0]));
    }

    #[test]
    fn test_output_lines_are_crlf_terminated_with_trailing_space() {
        let dir = tempfile::tempdir().unwrap();
        let (vectors_path, dictionary_path, output_path) = write_fixtures(dir.path());

        let mut pipeline =
            LemmaPipeline::new(vectors_path, dictionary_path, output_path.clone(), None, false)
                .unwrap();
        pipeline.run().unwrap();

        let contents = fs::read_to_string(&output_path).unwrap();
        for line in contents.split_inclusive("\r\n") {
            assert!(line.ends_with(" \r\n"));
        }
    }

    #[test]
    fn test_header_emitted_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let (vectors_path, dictionary_path, output_path) = write_fixtures(dir.path());

        let mut pipeline =
            LemmaPipeline::new(vectors_path, dictionary_path, output_path.clone(), None, true)
                .unwrap();
        pipeline.run().unwrap();

        let contents = fs::read_to_string(&output_path).unwrap();
        assert!(contents.starts_with("2 2\r\n"));

        // a header-bearing output is loadable by our own loader
        let reloaded = vector_loader::load_vectors_from_path(&output_path, None).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.row(0), &[0.5, 0.5]);
    }

    #[test]
    fn test_max_vocab_limits_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let (vectors_path, dictionary_path, output_path) = write_fixtures(dir.path());

        let mut pipeline =
            LemmaPipeline::new(vectors_path, dictionary_path, output_path.clone(), Some(2), false)
                .unwrap();
        pipeline.run().unwrap();

        // only cats and cat were loaded, both collapsing to one lemma
        let output = parse_output(&output_path);
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].0, "cat");
    }

    #[test]
    fn test_stages_out_of_order_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (vectors_path, dictionary_path, output_path) = write_fixtures(dir.path());

        let mut pipeline =
            LemmaPipeline::new(vectors_path, dictionary_path, output_path, None, false).unwrap();

        assert!(pipeline.group().is_err());
        assert!(pipeline.average().is_err());
        assert!(pipeline.write().is_err());

        pipeline.load().unwrap();
        assert!(pipeline.average().is_err());
    }

    #[test]
    fn test_reload_invalidates_later_stages() {
        let dir = tempfile::tempdir().unwrap();
        let (vectors_path, dictionary_path, output_path) = write_fixtures(dir.path());

        let mut pipeline =
            LemmaPipeline::new(vectors_path, dictionary_path, output_path, None, false).unwrap();
        pipeline.load().unwrap();
        pipeline.group().unwrap();
        pipeline.load().unwrap();

        assert!(pipeline.average().is_err());
    }

    #[test]
    fn test_missing_vector_file_rejected_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let (_, dictionary_path, output_path) = write_fixtures(dir.path());
        let missing = dir.path().join("missing.vec");

        let result = LemmaPipeline::new(
            missing.to_str().unwrap().to_string(),
            dictionary_path,
            output_path,
            None,
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_stats_reflect_completed_stages() {
        let dir = tempfile::tempdir().unwrap();
        let (vectors_path, dictionary_path, output_path) = write_fixtures(dir.path());

        let mut pipeline =
            LemmaPipeline::new(vectors_path, dictionary_path, output_path, None, false).unwrap();
        assert!(pipeline.stats().is_none());

        pipeline.load().unwrap();
        pipeline.group().unwrap();
        let stats = pipeline.stats().unwrap();
        assert_eq!(stats.vocabulary_size, 3);
        assert_eq!(stats.dimensionality, 2);
        assert_eq!(stats.distinct_lemmas, 2);
        assert_eq!(stats.largest_group, 2);
    }

    #[test]
    fn test_duplicate_token_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let (_, dictionary_path, output_path) = write_fixtures(dir.path());
        let vectors_path: PathBuf = dir.path().join("dup.vec");
        fs::write(&vectors_path, "2 1\ncat 1.0\ncat 2.0\n").unwrap();

        let mut pipeline = LemmaPipeline::new(
            vectors_path.to_str().unwrap().to_string(),
            dictionary_path,
            output_path.clone(),
            None,
            false,
        )
        .unwrap();

        assert!(pipeline.run().is_err());
        // the writer stage never ran
        assert!(!Path::new(&output_path).exists());
    }
}
