use crate::backend::MatrixBackend;

/// Portable scalar backend.
///
/// Straightforward loops with a single accumulator per output element. This
/// is the numerical reference every vector backend is tested against, and
/// the fallback when no vector family is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarBackend;

impl ScalarBackend {
    pub const fn new() -> Self {
        ScalarBackend
    }
}

impl MatrixBackend for ScalarBackend {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn lanes(&self) -> usize {
        1
    }

    fn add(&self, a: &[f32], b: &[f32], width: usize, height: usize, out: &mut [f32]) {
        let len = width * height;
        for ((r, x), y) in out[..len].iter_mut().zip(&a[..len]).zip(&b[..len]) {
            *r = x + y;
        }
    }

    fn subtract(&self, a: &[f32], b: &[f32], width: usize, height: usize, out: &mut [f32]) {
        let len = width * height;
        for ((r, x), y) in out[..len].iter_mut().zip(&a[..len]).zip(&b[..len]) {
            *r = x - y;
        }
    }

    fn multiply(
        &self,
        a: &[f32],
        b: &[f32],
        a_width: usize,
        a_height: usize,
        b_width: usize,
        out: &mut [f32],
    ) {
        let a = &a[..a_width * a_height];
        let b = &b[..a_width * b_width];
        let out = &mut out[..a_height * b_width];

        for i in 0..b_width {
            for j in 0..a_height {
                let mut sum = 0.0f32;
                for k in 0..a_width {
                    sum += a[j * a_width + k] * b[k * b_width + i];
                }
                out[j * b_width + i] = sum;
            }
        }
    }

    fn multiply_transposed(
        &self,
        a: &[f32],
        b: &[f32],
        width: usize,
        a_height: usize,
        b_height: usize,
        out: &mut [f32],
    ) {
        let a = &a[..width * a_height];
        let b = &b[..width * b_height];
        let out = &mut out[..a_height * b_height];

        for j in 0..a_height {
            let row_a = &a[j * width..(j + 1) * width];
            for i in 0..b_height {
                let row_b = &b[i * width..(i + 1) * width];
                let mut sum = 0.0f32;
                for k in 0..width {
                    sum += row_a[k] * row_b[k];
                }
                out[j * b_height + i] = sum;
            }
        }
    }
}

/// Write the transpose of a `width` x `height` matrix into `out`.
///
/// `out` receives `width` rows of `height` elements, which is the layout
/// [`multiply_transposed`](crate::multiply_transposed) expects for its
/// right operand.
///
/// # Panics
/// Panics if either slice holds fewer than `width * height` elements.
pub fn transpose(src: &[f32], width: usize, height: usize, out: &mut [f32]) {
    let src = &src[..width * height];
    let out = &mut out[..width * height];
    for row in 0..height {
        for col in 0..width {
            out[col * height + row] = src[row * width + col];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> ScalarBackend {
        ScalarBackend::new()
    }

    #[test]
    fn test_multiply_identity() {
        let b = backend();
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let eye = vec![1.0, 0.0, 0.0, 1.0];
        let mut c = vec![0.0; 4];
        b.multiply(&a, &eye, 2, 2, 2, &mut c);
        assert_eq!(c, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_multiply_basic() {
        let b = backend();
        // [1,2;3,4] @ [5,6;7,8] = [19,22;43,50]
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let x = vec![5.0, 6.0, 7.0, 8.0];
        let mut c = vec![0.0; 4];
        b.multiply(&a, &x, 2, 2, 2, &mut c);
        assert_eq!(c, vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_multiply_rectangular() {
        let b = backend();
        // [1,2,3] @ [4;5;6] = [32]
        let mut c = vec![0.0; 1];
        b.multiply(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], 3, 1, 1, &mut c);
        assert_eq!(c, vec![32.0]);

        // [4;5;6] @ [1,2,3] is the 3x3 outer product
        let mut c = vec![0.0; 9];
        b.multiply(&[4.0, 5.0, 6.0], &[1.0, 2.0, 3.0], 1, 3, 3, &mut c);
        assert_eq!(c, vec![4.0, 8.0, 12.0, 5.0, 10.0, 15.0, 6.0, 12.0, 18.0]);
    }

    #[test]
    fn test_multiply_transposed_basic() {
        let b = backend();
        // B stored transposed: rows are the columns of [5,6;7,8]
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let bt = vec![5.0, 7.0, 6.0, 8.0];
        let mut c = vec![0.0; 4];
        b.multiply_transposed(&a, &bt, 2, 2, 2, &mut c);
        assert_eq!(c, vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_add() {
        let b = backend();
        let mut r = vec![0.0; 2];
        b.add(&[1.0, 2.0], &[3.0, 4.0], 2, 1, &mut r);
        assert_eq!(r, vec![4.0, 6.0]);
    }

    #[test]
    fn test_subtract() {
        let b = backend();
        let mut r = vec![0.0; 2];
        b.subtract(&[1.0, 2.0], &[3.0, 5.0], 1, 2, &mut r);
        assert_eq!(r, vec![-2.0, -3.0]);
    }

    #[test]
    fn test_only_leading_elements_written() {
        let b = backend();
        let mut r = vec![9.0; 4];
        b.add(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0], 3, 1, &mut r);
        assert_eq!(r, vec![2.0, 3.0, 4.0, 9.0]);
    }

    #[test]
    #[should_panic]
    fn test_short_slice_panics() {
        let b = backend();
        let mut r = vec![0.0; 4];
        b.add(&[1.0, 2.0], &[1.0, 2.0, 3.0, 4.0], 2, 2, &mut r);
    }

    #[test]
    fn test_transpose() {
        // 3 wide, 2 high
        let src = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut out = vec![0.0; 6];
        transpose(&src, 3, 2, &mut out);
        assert_eq!(out, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }
}
