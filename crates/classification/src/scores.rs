//! Score evaluation

use serde::{Deserialize, Serialize};

use crate::ClassificationError;

/// Outcome of evaluating one score buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Decision {
    /// No confident classification
    #[default]
    None,
    /// Index of the top-scoring class
    Class(usize),
}

impl Decision {
    /// Convert an index from a decoder that uses negative values as "no result"
    pub fn from_raw(raw: i64) -> Self {
        usize::try_from(raw).map_or(Decision::None, Decision::Class)
    }

    pub fn index(self) -> Option<usize> {
        match self {
            Decision::Class(index) => Some(index),
            Decision::None => None,
        }
    }

    pub fn is_none(self) -> bool {
        matches!(self, Decision::None)
    }
}

/// Element type of a raw output tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorType {
    /// Quantized model output, one byte per class
    #[default]
    Uint8,
    /// Little-endian IEEE 754 single precision, four bytes per class
    Float32,
}

impl TensorType {
    /// Bytes per score
    pub fn element_size(self) -> usize {
        match self {
            TensorType::Uint8 => 1,
            TensorType::Float32 => 4,
        }
    }

    /// Decode raw tensor bytes and evaluate them against `label_count` classes
    pub fn evaluate(
        self,
        data: &[u8],
        label_count: usize,
        min_score: f64,
    ) -> Result<Decision, ClassificationError> {
        match self {
            TensorType::Uint8 => evaluate(data, label_count, min_score),
            TensorType::Float32 => {
                let element_size = self.element_size();
                if data.len() % element_size != 0 {
                    return Err(ClassificationError::MalformedTensor {
                        len: data.len(),
                        element_size,
                    });
                }

                let count = data.len() / element_size;
                if count != label_count {
                    return Err(ClassificationError::SizeMismatch {
                        expected: label_count,
                        actual: count,
                    });
                }

                let scores = data
                    .chunks_exact(element_size)
                    .map(|b| f64::from(f32::from_le_bytes([b[0], b[1], b[2], b[3]])));
                Ok(top_class(scores, min_score))
            }
        }
    }
}

/// Pick the top-scoring class of a score buffer.
///
/// The buffer must hold exactly one score per label. Ties go to the lowest
/// index, and a top score that is not strictly greater than `min_score`
/// yields [`Decision::None`]. NaN scores never win.
pub fn evaluate<S>(
    scores: &[S],
    label_count: usize,
    min_score: f64,
) -> Result<Decision, ClassificationError>
where
    S: Copy + Into<f64>,
{
    if scores.len() != label_count {
        return Err(ClassificationError::SizeMismatch {
            expected: label_count,
            actual: scores.len(),
        });
    }

    Ok(top_class(scores.iter().map(|&s| s.into()), min_score))
}

fn top_class(scores: impl Iterator<Item = f64>, min_score: f64) -> Decision {
    let mut best: Option<(usize, f64)> = None;

    for (index, score) in scores.enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((index, score)),
        }
    }

    match best {
        Some((index, top)) if top > min_score => Decision::Class(index),
        _ => Decision::None,
    }
}
