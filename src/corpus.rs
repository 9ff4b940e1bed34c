//! Question/answer training corpus
//!
//! Pairs are normalized (trimmed, lower-cased) on the way in. A question maps
//! to exactly one expected answer; inserting a known question replaces its
//! answer but keeps its position.

use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// One training pair as it appears in corpus files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    #[serde(alias = "pregunta")]
    pub question: String,
    #[serde(alias = "respuesta")]
    pub answer: String,
}

impl QaPair {
    pub fn new(question: impl AsRef<str>, answer: impl AsRef<str>) -> Self {
        Self {
            question: normalize(question.as_ref()),
            answer: normalize(answer.as_ref()),
        }
    }
}

/// Trim and lower-case.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<QaPair>", into = "Vec<QaPair>")]
pub struct TrainingCorpus {
    pairs: Vec<QaPair>,
    positions: HashMap<String, usize>,
}

impl TrainingCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, Q, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Q, A)>,
        Q: AsRef<str>,
        A: AsRef<str>,
    {
        let mut corpus = Self::new();
        for (question, answer) in pairs {
            corpus.insert(question, answer);
        }
        corpus
    }

    /// Load a JSON array of `{"question", "answer"}` objects.
    ///
    /// Spanish keys (`pregunta`, `respuesta`) are accepted as well. Any read
    /// or parse failure rejects the whole file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |message: String| Error::CorpusLoad {
            path: path.display().to_string(),
            message,
        };
        let file = File::open(path).map_err(|e| load_error(e.to_string()))?;
        let pairs: Vec<QaPair> =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| load_error(e.to_string()))?;

        let corpus: Self = pairs.into();
        info!(
            path = %path.display(),
            pairs = corpus.len(),
            answers = corpus.distinct_answers().len(),
            "Loaded training corpus"
        );
        Ok(corpus)
    }

    /// Insert or replace a pair. Returns `true` when the question is new.
    pub fn insert(&mut self, question: impl AsRef<str>, answer: impl AsRef<str>) -> bool {
        let pair = QaPair::new(question, answer);
        match self.positions.get(&pair.question) {
            Some(&position) => {
                self.pairs[position].answer = pair.answer;
                false
            }
            None => {
                self.positions.insert(pair.question.clone(), self.pairs.len());
                self.pairs.push(pair);
                true
            }
        }
    }

    pub fn answer_for(&self, question: &str) -> Option<&str> {
        self.positions
            .get(&normalize(question))
            .map(|&position| self.pairs[position].answer.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &QaPair> {
        self.pairs.iter()
    }

    pub fn pairs(&self) -> &[QaPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Answers in first-seen order, without duplicates.
    pub fn distinct_answers(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.pairs
            .iter()
            .map(|pair| pair.answer.as_str())
            .filter(|answer| seen.insert(*answer))
            .collect()
    }
}

impl From<Vec<QaPair>> for TrainingCorpus {
    fn from(pairs: Vec<QaPair>) -> Self {
        Self::from_pairs(pairs.into_iter().map(|pair| (pair.question, pair.answer)))
    }
}

impl From<TrainingCorpus> for Vec<QaPair> {
    fn from(corpus: TrainingCorpus) -> Self {
        corpus.pairs
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_insert_normalizes_and_replaces() {
        let mut corpus = TrainingCorpus::new();
        assert!(corpus.insert("  Hola ", "Hola, ¿qué tal?"));
        assert!(!corpus.insert("hola", "buenas"));
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.answer_for("HOLA"), Some("buenas"));
        assert_eq!(corpus.answer_for("adios"), None);
    }

    #[test]
    fn test_distinct_answers_keep_order() {
        let corpus = TrainingCorpus::from_pairs([
            ("hola", "buenas"),
            ("que tal", "bien gracias"),
            ("buenos dias", "buenas"),
        ]);
        assert_eq!(corpus.distinct_answers(), vec!["buenas", "bien gracias"]);
    }

    #[test]
    fn test_load_json_with_spanish_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"pregunta": "Hola", "respuesta": "Buenas"}}, {{"question": "adios", "answer": "hasta luego"}}]"#
        )
        .unwrap();

        let corpus = TrainingCorpus::load_json(file.path()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.answer_for("hola"), Some("buenas"));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"question": "hola"}}]"#).unwrap();
        assert!(matches!(
            TrainingCorpus::load_json(file.path()),
            Err(Error::CorpusLoad { .. })
        ));
        assert!(matches!(
            TrainingCorpus::load_json("/nonexistent/corpus.json"),
            Err(Error::CorpusLoad { .. })
        ));
    }
}
