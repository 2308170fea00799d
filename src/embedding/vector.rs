// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unit-norm embedding vectors.

/// An L2-normalized embedding vector.
///
/// The only ways to build one normalize the input, so every `Embedding`
/// seen outside this module has unit length.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// Normalizes `values` to unit length.
    ///
    /// Returns `None` for empty vectors, non-finite components, or a zero
    /// norm, none of which can be normalized.
    pub fn from_raw(mut values: Vec<f32>) -> Option<Self> {
        if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let norm = l2_norm(&values);
        if norm == 0.0 || !norm.is_finite() {
            return None;
        }
        for value in values.iter_mut() {
            *value = (f64::from(*value) / norm) as f32;
        }
        Some(Self(values))
    }

    /// Component-wise arithmetic mean of `vectors`, renormalized.
    ///
    /// Returns `None` when the input is empty, dimensions disagree, or the
    /// mean cancels out to zero.
    pub fn mean<'a, I>(vectors: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Embedding>,
    {
        let mut iter = vectors.into_iter();
        let first = iter.next()?;
        let mut sum: Vec<f64> = first.0.iter().map(|&v| f64::from(v)).collect();
        let mut count = 1usize;
        for vector in iter {
            if vector.dim() != sum.len() {
                return None;
            }
            for (acc, &value) in sum.iter_mut().zip(vector.0.iter()) {
                *acc += f64::from(value);
            }
            count += 1;
        }
        let n = count as f64;
        Self::from_raw(sum.into_iter().map(|acc| (acc / n) as f32).collect())
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Dot product with another embedding, which equals cosine similarity
    /// for unit vectors. Mismatched dimensions yield `None`.
    pub fn dot(&self, other: &Embedding) -> Option<f32> {
        if self.dim() != other.dim() {
            return None;
        }
        let dot: f64 = self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(&a, &b)| f64::from(a) * f64::from(b))
            .sum();
        Some(dot as f32)
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// Euclidean length of a vector, accumulated in f64.
pub fn l2_norm(vector: &[f32]) -> f64 {
    vector
        .iter()
        .map(|&v| f64::from(v) * f64::from(v))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn wavy(dim: usize) -> Vec<f32> {
        (0..dim).map(|i| (i as f32 * 0.37).sin() * 3.0 + 0.01).collect()
    }

    #[test]
    fn normalized_vectors_have_unit_norm() {
        for raw in [
            vec![3.0, 4.0],
            vec![0.1, -7.5, 2.2, 9.0],
            vec![1e-3; 384],
            wavy(384),
            vec![0.02; 1024],
            wavy(1024),
        ] {
            let embedding = Embedding::from_raw(raw).unwrap();
            assert!((l2_norm(embedding.as_slice()) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn self_similarity_of_large_vectors_is_one() {
        let embedding = Embedding::from_raw(wavy(1024)).unwrap();
        let dot = embedding.dot(&embedding).unwrap();
        assert!((dot - 1.0).abs() < EPS);

        let mean = Embedding::mean([&embedding, &embedding]).unwrap();
        assert!((l2_norm(mean.as_slice()) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = Embedding::from_raw(vec![1.0, 2.0, 3.0]).unwrap();
        let twice = Embedding::from_raw(once.as_slice().to_vec()).unwrap();
        for (a, b) in once.as_slice().iter().zip(twice.as_slice()) {
            assert!((a - b).abs() < EPS);
        }
    }

    #[test]
    fn rejects_degenerate_input() {
        assert!(Embedding::from_raw(Vec::new()).is_none());
        assert!(Embedding::from_raw(vec![0.0, 0.0]).is_none());
        assert!(Embedding::from_raw(vec![1.0, f32::NAN]).is_none());
        assert!(Embedding::from_raw(vec![f32::INFINITY, 1.0]).is_none());
    }

    #[test]
    fn mean_of_single_vector_is_itself() {
        let v = Embedding::from_raw(vec![0.2, 0.5, -0.1]).unwrap();
        let mean = Embedding::mean([&v]).unwrap();
        for (a, b) in v.as_slice().iter().zip(mean.as_slice()) {
            assert!((a - b).abs() < EPS);
        }
    }

    #[test]
    fn mean_renormalizes() {
        let a = Embedding::from_raw(vec![1.0, 0.0]).unwrap();
        let b = Embedding::from_raw(vec![0.0, 1.0]).unwrap();
        let mean = Embedding::mean([&a, &b]).unwrap();
        let expected = std::f32::consts::FRAC_1_SQRT_2;
        assert!((mean.as_slice()[0] - expected).abs() < EPS);
        assert!((mean.as_slice()[1] - expected).abs() < EPS);
    }

    #[test]
    fn mean_rejects_cancelling_or_mismatched_vectors() {
        let a = Embedding::from_raw(vec![1.0, 0.0]).unwrap();
        let b = Embedding::from_raw(vec![-1.0, 0.0]).unwrap();
        assert!(Embedding::mean([&a, &b]).is_none());

        let c = Embedding::from_raw(vec![1.0, 0.0, 0.0]).unwrap();
        assert!(Embedding::mean([&a, &c]).is_none());
        assert!(Embedding::mean(std::iter::empty()).is_none());
    }
}
