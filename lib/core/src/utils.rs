use itertools::MultiProduct;

/// Rust version of Python's `itertools.product()`.
/// It returns the cartesian product of the input iterables, and it is
/// semantically equivalent to `repeat` nested for loops.
///
/// # Arguments
///
/// * `it` - An iterator over a cloneable data structure
/// * `repeat` - Number of repetitions of the given iterator
///
/// See https://stackoverflow.com/a/68231315/3592218
pub fn product_repeat<I>(it: I, repeat: usize) -> MultiProduct<I>
where
    I: Iterator + Clone,
    I::Item: Clone,
{
    use itertools::Itertools;

    std::iter::repeat(it).take(repeat).multi_cartesian_product()
}

/// Rounds every coordinate to the nearest integer, ties to even.
pub fn round_point(point: &ndarray::Array1<f64>) -> ndarray::Array1<f64> {
    point.mapv(f64::round_ties_even)
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use ndarray::arr1;

    use super::*;

    #[test]
    fn test_product_repeat_order() {
        let signs = product_repeat([-1, 1].into_iter(), 2).collect_vec();
        assert_eq!(signs, vec![vec![-1, -1], vec![-1, 1], vec![1, -1], vec![1, 1]]);
    }

    #[test]
    fn test_round_point() {
        let point = arr1(&[0.5, 1.5, 0.49, -0.2, 2.51]);
        assert_eq!(round_point(&point), arr1(&[0.0, 2.0, 0.0, -0.0, 3.0]));
    }
}
