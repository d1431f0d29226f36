//! Word feature encoding and the word-recognition preset.
//!
//! `encode_word` is a hand-written feature policy, not a learned
//! embedding. Layout of the 25 features:
//!
//! | index  | feature |
//! |--------|---------|
//! | 0      | length / 12, capped at 1 |
//! | 1      | vowel ratio |
//! | 2–4    | alphabet position of the first, second and last letter (0 = absent) |
//! | 5–16   | consonant clusters `bl br cl cr dr fl fr gl gr pl pr tr` (0/1) |
//! | 17–20  | digraphs `ch ll rr qu` (0/1) |
//! | 21–24  | share of the mirror letters `b d p q` |

use rand::Rng;

use crate::classify::classifier::Classifier;
use crate::error::Result;
use crate::network::{network::Network, spec::NetworkSpec};
use crate::train::example::TrainingExample;

pub const WORD_FEATURES: usize = 25;

const MAX_WORD_LEN: f64 = 12.0;
const ALPHABET: &str = "abcdefghijklmnñopqrstuvwxyz";
const VOWELS: &str = "aeiou";
const CLUSTERS: [&str; 12] = ["bl", "br", "cl", "cr", "dr", "fl", "fr", "gl", "gr", "pl", "pr", "tr"];
const DIGRAPHS: [&str; 4] = ["ch", "ll", "rr", "qu"];
const MIRROR_LETTERS: [char; 4] = ['b', 'd', 'p', 'q'];

/// Practice vocabulary, in output-unit order.
pub const VOCABULARY: [&str; 14] = [
    "barco", "dedo", "pato", "queso", "mano", "nube", "brazo",
    "dragón", "plato", "flor", "tren", "globo", "llave", "perro",
];

/// Lower-cases, folds accented vowels, and drops anything that is not a letter.
pub fn normalize_word(word: &str) -> String {
    word.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            other => other,
        })
        .filter(|c| ALPHABET.contains(*c))
        .collect()
}

/// Position in the Spanish alphabet scaled to `(0, 1]`; 0 when absent.
fn letter_position(c: Option<char>) -> f64 {
    let total = ALPHABET.chars().count() as f64;
    c.and_then(|c| ALPHABET.chars().position(|a| a == c))
        .map(|i| (i + 1) as f64 / total)
        .unwrap_or(0.0)
}

pub fn encode_word(word: &str) -> Vec<f64> {
    let w = normalize_word(word);
    let chars: Vec<char> = w.chars().collect();
    let len = chars.len() as f64;
    let ratio = |count: usize| if chars.is_empty() { 0.0 } else { count as f64 / len };
    let flag = |pattern: &str| if w.contains(pattern) { 1.0 } else { 0.0 };

    let mut features = Vec::with_capacity(WORD_FEATURES);
    features.push((len / MAX_WORD_LEN).min(1.0));
    features.push(ratio(chars.iter().filter(|c| VOWELS.contains(**c)).count()));
    features.push(letter_position(chars.first().copied()));
    features.push(letter_position(chars.get(1).copied()));
    features.push(letter_position(chars.last().copied()));
    features.extend(CLUSTERS.iter().map(|c| flag(c)));
    features.extend(DIGRAPHS.iter().map(|d| flag(d)));
    features.extend(MIRROR_LETTERS.iter().map(|m| ratio(chars.iter().filter(|c| *c == m).count())));
    features
}

/// Number of error-prone clusters, digraphs and mirror letters in `word`.
pub fn difficulty(word: &str) -> usize {
    let w = normalize_word(word);
    CLUSTERS.iter().chain(DIGRAPHS.iter()).filter(|p| w.contains(*p)).count()
        + w.chars().filter(|c| MIRROR_LETTERS.contains(c)).count()
}

pub fn word_labels() -> Vec<String> {
    VOCABULARY.iter().map(|w| w.to_string()).collect()
}

pub fn word_spec(hidden_size: usize) -> NetworkSpec {
    NetworkSpec::new(WORD_FEATURES, hidden_size, VOCABULARY.len())
}

/// Each vocabulary word once, plus `jittered_copies` whose continuous
/// features (indices 0–4) are perturbed by up to `±jitter`.
pub fn word_training_set<R: Rng + ?Sized>(jittered_copies: usize, jitter: f64, rng: &mut R) -> Vec<TrainingExample> {
    let mut examples = Vec::with_capacity(VOCABULARY.len() * (jittered_copies + 1));
    for (class, word) in VOCABULARY.iter().enumerate() {
        let clean = encode_word(word);
        examples.push(TrainingExample::one_hot(clean.clone(), class, VOCABULARY.len()));
        for _ in 0..jittered_copies {
            let mut noisy = clean.clone();
            for v in noisy.iter_mut().take(5) {
                if jitter > 0.0 {
                    *v = (*v + rng.gen_range(-jitter..=jitter)).clamp(0.0, 1.0);
                }
            }
            examples.push(TrainingExample::one_hot(noisy, class, VOCABULARY.len()));
        }
    }
    examples
}

pub fn word_classifier(network: Network) -> Result<Classifier> {
    Classifier::new(network, word_labels())
}
