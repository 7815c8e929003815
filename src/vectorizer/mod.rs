//! TF-IDF vectorization over the whole chunk corpus.
//!
//! The vocabulary is rebuilt from scratch on every fit. Adding a document can
//! introduce new terms (changing the dimension) and shifts every document
//! frequency (changing every weight), so vectors from an earlier fit must not
//! be mixed with vectors from a later one.

use crate::error::{FolioError, Result};
use crate::vector_store::Matrix;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Term frequency / inverse document frequency vectorizer.
///
/// Tokens are lowercased runs of two or more word characters. Weights use
/// smoothed IDF, `ln((1 + n) / (1 + df)) + 1`, and every vector is scaled to
/// unit length.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    token_regex: Regex,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    fitted: bool,
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        let token_regex = Regex::new(r"\b\w\w+\b").expect("Invalid regex");

        Self {
            token_regex,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            fitted: false,
        }
    }

    /// Split text into lowercase tokens.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.token_regex
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Whether `fit` has run at least once.
    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Number of distinct terms, which is also the vector dimension.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Column index of a term, if it is in the vocabulary.
    pub fn column(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// IDF weight of a term, if it is in the vocabulary.
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.column(term).map(|c| self.idf[c])
    }

    /// Rebuild vocabulary and IDF weights from the given corpus.
    ///
    /// Columns are assigned in lexicographic term order so the same corpus
    /// always yields the same layout.
    pub fn fit(&mut self, corpus: &[String]) {
        let mut document_frequency: BTreeMap<String, u32> = BTreeMap::new();

        for text in corpus {
            let mut seen: Vec<String> = self.tokenize(text);
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n = corpus.len() as f64;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());

        for (column, (term, df)) in document_frequency.into_iter().enumerate() {
            let weight = ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0;
            idf.push(weight as f32);
            vocabulary.insert(term, column);
        }

        debug!(
            "Fitted vectorizer on {} chunks, vocabulary size {}",
            corpus.len(),
            vocabulary.len()
        );

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.fitted = true;
    }

    /// Fit on the corpus and return one vector per text, in order.
    pub fn fit_transform(&mut self, corpus: &[String]) -> Result<Matrix> {
        self.fit(corpus);

        let dim = self.vocabulary_size();
        let mut data = Vec::with_capacity(corpus.len() * dim);
        for text in corpus {
            data.extend(self.weigh(text));
        }

        Matrix::from_flat(corpus.len(), dim, data)
    }

    /// Project a query into the current vocabulary space.
    ///
    /// Terms not seen during the last fit are dropped. Fails with
    /// [`FolioError::ModelNotReady`] before the first fit.
    pub fn transform(&self, text: &str) -> Result<Vec<f32>> {
        if !self.fitted {
            return Err(FolioError::ModelNotReady);
        }
        Ok(self.weigh(text))
    }

    fn weigh(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.vocabulary_size()];

        for token in self.tokenize(text) {
            if let Some(&column) = self.vocabulary.get(&token) {
                vector[column] += 1.0;
            }
        }

        for (value, idf) in vector.iter_mut().zip(self.idf.iter()) {
            *value *= idf;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in vector.iter_mut() {
                *value /= norm;
            }
        }

        vector
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_tokenize() {
        let v = TfidfVectorizer::new();
        assert_eq!(
            v.tokenize("The Sky is BLUE, a b c! naïve co-op"),
            vec!["the", "sky", "is", "blue", "naïve", "co", "op"]
        );
    }

    #[test]
    fn test_transform_before_fit() {
        let v = TfidfVectorizer::new();
        assert!(!v.is_fitted());
        assert!(matches!(v.transform("anything"), Err(FolioError::ModelNotReady)));
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let mut v = TfidfVectorizer::new();
        v.fit(&corpus(&["zebra apple mango"]));
        assert_eq!(v.column("apple"), Some(0));
        assert_eq!(v.column("mango"), Some(1));
        assert_eq!(v.column("zebra"), Some(2));
    }

    #[test]
    fn test_idf_favours_rare_terms() {
        let mut v = TfidfVectorizer::new();
        v.fit(&corpus(&["common rare", "common", "common"]));

        let common = v.idf("common").unwrap();
        let rare = v.idf("rare").unwrap();
        assert!(rare > common);
        // Term present everywhere: ln(4/4) + 1.
        assert!((common - 1.0).abs() < 1e-6);
        assert!((rare - ((4.0f32 / 2.0).ln() + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_fit_transform_shape_and_norm() {
        let mut v = TfidfVectorizer::new();
        let m = v
            .fit_transform(&corpus(&["the sky is blue", "grass is green", "!!"]))
            .unwrap();

        assert_eq!(m.rows(), 3);
        assert_eq!(m.dim(), v.vocabulary_size());
        assert_eq!(v.vocabulary_size(), 6);

        for i in 0..2 {
            let norm: f32 = m.row(i).iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
        // A chunk without tokens maps to the zero vector.
        assert!(m.row(2).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_transform_drops_unknown_terms() {
        let mut v = TfidfVectorizer::new();
        v.fit(&corpus(&["the sky is blue"]));

        let unknown = v.transform("completely unrelated words").unwrap();
        assert_eq!(unknown.len(), 4);
        assert!(unknown.iter().all(|&x| x == 0.0));

        let known = v.transform("what colour is the sky").unwrap();
        assert!(known[v.column("sky").unwrap()] > 0.0);
        assert_eq!(known[v.column("blue").unwrap()], 0.0);
    }

    #[test]
    fn test_refit_grows_vocabulary() {
        let mut v = TfidfVectorizer::new();
        let mut texts = corpus(&["the sky is blue"]);
        v.fit_transform(&texts).unwrap();
        let before = v.vocabulary_size();
        let sky_before = v.idf("sky").unwrap();

        texts.push("grass is green".to_string());
        v.fit_transform(&texts).unwrap();
        assert!(v.vocabulary_size() > before);
        // Corpus size changed, so the weight of an existing term moved too.
        assert!(v.idf("sky").unwrap() > sky_before);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let texts = corpus(&["alpha beta", "beta gamma", "gamma delta alpha"]);
        let mut a = TfidfVectorizer::new();
        let mut b = TfidfVectorizer::new();
        assert_eq!(a.fit_transform(&texts).unwrap(), b.fit_transform(&texts).unwrap());
    }
}
