//! Dense vector helpers shared by the encoder, the centroid builder and the predictor.

/// Returns the Euclidean (L2) norm of `v`.
#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scales `v` to unit length in place.
///
/// Returns `false` and leaves `v` untouched when its norm is zero or not finite.
pub fn normalize_in_place(v: &mut [f32]) -> bool {
    let norm = l2_norm(v);
    if norm == 0.0 || !norm.is_finite() {
        return false;
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
    true
}

/// Returns `true` if `v` has unit length within `tolerance`.
#[inline]
pub fn is_unit(v: &[f32], tolerance: f32) -> bool {
    (l2_norm(v) - 1.0).abs() <= tolerance
}

/// Component-wise arithmetic mean of `vectors`.
///
/// Accumulates in `f64`. Returns `None` for an empty input or when the vectors disagree on
/// dimension.
pub fn mean(vectors: &[&[f32]]) -> Option<Vec<f32>> {
    let first = vectors.first()?;
    let dim = first.len();
    let mut sums = vec![0.0f64; dim];

    for v in vectors {
        if v.len() != dim {
            return None;
        }
        for (acc, x) in sums.iter_mut().zip(v.iter()) {
            *acc += f64::from(*x);
        }
    }

    let count = vectors.len() as f64;
    Some(sums.into_iter().map(|s| (s / count) as f32).collect())
}

/// Euclidean distance between `a` and `b`.
///
/// Callers guarantee equal lengths; extra trailing components of the longer slice are ignored.
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "distance between vectors of unequal length");
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

/// Returns `true` if every component of `v` is finite.
#[inline]
pub fn is_finite(v: &[f32]) -> bool {
    v.iter().all(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_norm() {
        assert_eq!(l2_norm(&[3.0, 4.0]), 5.0);
        assert_eq!(l2_norm(&[]), 0.0);
    }

    #[test]
    fn test_normalize_in_place() {
        let mut v = vec![3.0, 0.0, 4.0];
        assert!(normalize_in_place(&mut v));
        assert!(is_unit(&v, 1e-6));
        assert!((v[0] - 0.6).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        assert!(!normalize_in_place(&mut zero));
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[test]
    fn test_mean() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        assert_eq!(mean(&[&a, &b]), Some(vec![0.5, 0.5]));
        assert_eq!(mean(&[]), None);

        let c = [1.0, 2.0, 3.0];
        assert_eq!(mean(&[&a, &c]), None);
    }

    #[test]
    fn test_euclidean_distance() {
        assert_eq!(euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(euclidean_distance(&[1.0, 1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_is_finite() {
        assert!(is_finite(&[0.0, -1.0]));
        assert!(!is_finite(&[f32::NAN]));
        assert!(!is_finite(&[f32::INFINITY, 0.0]));
    }
}
