// Vector arithmetic shared by the group builder, the scorer and the
// nearest-neighbour search.
//
// Spaces store f32 components (the on-disk precision of word2vec/GloVe files)
// while derived vectors are kept in f64. All reductions accumulate in f64 so
// mixing the two never loses precision on the derived side.

/// Below this magnitude a vector is treated as zero.
pub const NORM_EPSILON: f64 = 1e-12;

/// Dot product of two equally sized vectors.
pub fn dot<A, B>(a: &[A], b: &[B]) -> f64
where
    A: Copy + Into<f64>,
    B: Copy + Into<f64>,
{
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| x.into() * y.into())
        .sum()
}

/// Euclidean (L2) norm.
pub fn norm<A: Copy + Into<f64>>(v: &[A]) -> f64 {
    v.iter()
        .map(|&x| {
            let x: f64 = x.into();
            x * x
        })
        .sum::<f64>()
        .sqrt()
}

/// Return `v / ‖v‖`, or `None` when the norm is (numerically) zero.
pub fn unit<A: Copy + Into<f64>>(v: &[A]) -> Option<Vec<f64>> {
    let n = norm(v);
    if n < NORM_EPSILON {
        return None;
    }
    Some(v.iter().map(|&x| x.into() / n).collect())
}

/// Cosine similarity in [-1, 1].
///
/// Returns 0.0 for empty inputs, mismatched lengths, or when either vector
/// has zero magnitude, so a degenerate vector can never leak NaN.
pub fn cosine_similarity<A, B>(a: &[A], b: &[B]) -> f64
where
    A: Copy + Into<f64>,
    B: Copy + Into<f64>,
{
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let denom = norm(a) * norm(b);
    if denom < NORM_EPSILON {
        0.0
    } else {
        (dot(a, b) / denom).clamp(-1.0, 1.0)
    }
}

/// Cosine distance `1 - cosine_similarity`, in [0, 2].
pub fn cosine_distance<A, B>(a: &[A], b: &[B]) -> f64
where
    A: Copy + Into<f64>,
    B: Copy + Into<f64>,
{
    1.0 - cosine_similarity(a, b)
}
