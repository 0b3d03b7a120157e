//! Dense four-index tensor stored in row-major order

use crate::error::{Agf2Error, Result};

/// Four-index array of `f64`, indexed `[p, q, r, s]` with `s` fastest.
///
/// Two-electron integrals are stored in chemists' notation `(pq|rs)`;
/// quasi-particle tensors use the layout `[x, i, j, a]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor4 {
    dims: [usize; 4],
    data: Vec<f64>,
}

impl Tensor4 {
    pub fn zeros(dims: [usize; 4]) -> Self {
        Tensor4 {
            dims,
            data: vec![0.0; dims.iter().product()],
        }
    }

    /// Wrap a row-major buffer, checking that its length matches `dims`.
    pub fn from_vec(dims: [usize; 4], data: Vec<f64>) -> Result<Self> {
        let expected: usize = dims.iter().product();
        if data.len() != expected {
            return Err(Agf2Error::shape("tensor buffer", &[expected], &[data.len()]));
        }
        Ok(Tensor4 { dims, data })
    }

    pub fn from_fn<F>(dims: [usize; 4], f: F) -> Self
    where
        F: Fn(usize, usize, usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(dims.iter().product());
        for p in 0..dims[0] {
            for q in 0..dims[1] {
                for r in 0..dims[2] {
                    for s in 0..dims[3] {
                        data.push(f(p, q, r, s));
                    }
                }
            }
        }
        Tensor4 { dims, data }
    }

    #[inline]
    fn offset(&self, p: usize, q: usize, r: usize, s: usize) -> usize {
        ((p * self.dims[1] + q) * self.dims[2] + r) * self.dims[3] + s
    }

    #[inline]
    pub fn get(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        self.data[self.offset(p, q, r, s)]
    }

    #[inline]
    pub fn dims(&self) -> [usize; 4] {
        self.dims
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Number of elements in one slab of the leading axis.
    pub fn row_stride(&self) -> usize {
        self.dims[1] * self.dims[2] * self.dims[3]
    }

    /// Contiguous slab `[p, .., .., ..]`.
    pub fn row(&self, p: usize) -> &[f64] {
        let stride = self.row_stride();
        &self.data[p * stride..(p + 1) * stride]
    }

    /// Swap the bra and ket pairs: `(pq|rs) -> (rs|pq)`.
    pub fn transpose_pairs(&self) -> Tensor4 {
        let [n0, n1, n2, n3] = self.dims;
        Tensor4::from_fn([n2, n3, n0, n1], |p, q, r, s| self.get(r, s, p, q))
    }

    /// Owned copy of the rows `p0..p1` of the leading axis.
    pub fn leading_block(&self, p0: usize, p1: usize) -> Tensor4 {
        let stride = self.row_stride();
        Tensor4 {
            dims: [p1 - p0, self.dims[1], self.dims[2], self.dims[3]],
            data: self.data[p0 * stride..p1 * stride].to_vec(),
        }
    }

    /// Contiguous slab `[p, q, .., ..]`.
    pub fn pair_slice(&self, p: usize, q: usize) -> &[f64] {
        let start = self.offset(p, q, 0, 0);
        &self.data[start..start + self.dims[2] * self.dims[3]]
    }

    /// Largest elementwise absolute difference to a tensor of the same shape.
    pub fn max_abs_diff(&self, other: &Tensor4) -> f64 {
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}
