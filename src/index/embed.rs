//! Text embedders for the question index

use crate::model::gemini::{post_json, GeminiSettings};
use crate::{PracticeError, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

/// Turns text into a fixed-length vector
pub trait Embedder {
    /// Identifier stored with the index; vectors from different embedders
    /// are not comparable
    fn name(&self) -> String;

    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Local feature-hashing embedder
///
/// Lower-cased word unigrams and bigrams hashed into a fixed number of
/// signed buckets, L2-normalized. Works offline and is stable across runs.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dims: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self { dims: 512 }
    }
}

impl HashingEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(8) }
    }

    fn bucket(&self, feature: &str) -> (usize, f32) {
        let digest = md5::compute(feature.as_bytes());
        let index = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize;
        let sign = if digest[4] & 1 == 0 { 1.0 } else { -1.0 };
        (index % self.dims, sign)
    }
}

impl Embedder for HashingEmbedder {
    fn name(&self) -> String {
        format!("hashing-{}", self.dims)
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let mut vector = vec![0.0f32; self.dims];
        let bigrams = words.windows(2).map(|pair| pair.join(" "));
        for feature in words.iter().map(|w| w.to_string()).chain(bigrams) {
            let (index, sign) = self.bucket(&feature);
            vector[index] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Gemini `embedContent` embedder
pub struct GeminiEmbedder {
    client: Client,
    settings: GeminiSettings,
}

impl GeminiEmbedder {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(PracticeError::MissingCredentials(
                "Gemini API key is empty".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(),
            settings,
        })
    }
}

impl Embedder for GeminiEmbedder {
    fn name(&self) -> String {
        format!("gemini-{}", self.settings.embedding_model)
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = &self.settings.embedding_model;
        let url = self.settings.endpoint(model, "embedContent");
        let body = json!({
            "model": format!("models/{}", model),
            "content": { "parts": [{ "text": text }] },
        });
        let response = post_json(&self.client, &self.settings, &url, &body)?;
        let parsed: EmbedResponse = serde_json::from_str(&response)?;
        Ok(parsed.embedding.values)
    }
}

/// Cosine similarity; zero when either vector is all zeros or lengths differ
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashing_is_deterministic_and_normalized() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("¿Dónde está la estación de tren?").unwrap();
        let b = embedder.embed("¿Dónde está la estación de tren?").unwrap();
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_related_text_scores_higher() {
        let embedder = HashingEmbedder::default();
        let query = embedder.embed("estación de tren").unwrap();
        let near = embedder.embed("¿Dónde está la estación de tren?").unwrap();
        let far = embedder.embed("Me gusta cocinar paella los domingos").unwrap();
        assert!(cosine(&query, &near) > cosine(&query, &far));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let v = HashingEmbedder::new(16).embed("¿?").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
        assert_eq!(cosine(&v, &v), 0.0);
    }
}
