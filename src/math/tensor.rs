use serde::{Serialize, Deserialize};

use crate::error::{LossError, Result};

/// Dense row-major tensor of `f64`.
///
/// The shape may have any number of axes; an empty shape is a scalar holding
/// exactly one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl Tensor {
    pub fn zeros(shape: &[usize]) -> Tensor {
        Tensor {
            shape: shape.to_vec(),
            data: vec![0.0; shape.iter().product()],
        }
    }

    /// A 0-axis tensor holding `value`.
    pub fn scalar(value: f64) -> Tensor {
        Tensor { shape: vec![], data: vec![value] }
    }

    /// Wraps `data` with the given shape. Fails if the element counts disagree.
    pub fn from_data(shape: &[usize], data: Vec<f64>) -> Result<Tensor> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(LossError::shape(format!(
                "shape {:?} holds {} elements but {} were given",
                shape, expected, data.len()
            )));
        }
        Ok(Tensor { shape: shape.to_vec(), data })
    }

    /// Builds a 2-D tensor from rows of equal length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Tensor> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != cols) {
            return Err(LossError::shape("rows must all have the same length"));
        }
        let shape = [rows.len(), cols];
        Tensor::from_data(&shape, rows.into_iter().flatten().collect())
    }

    /// Resizes to `shape`, keeping existing values where the count allows and
    /// zero-filling the rest.
    pub fn reshape(&mut self, shape: &[usize]) {
        self.shape = shape.to_vec();
        self.data.resize(shape.iter().product(), 0.0);
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn num_axes(&self) -> usize {
        self.shape.len()
    }

    /// Size of `axis`, or `None` when the tensor has fewer axes.
    pub fn dim(&self, axis: usize) -> Option<usize> {
        self.shape.get(axis).copied()
    }

    /// Total number of elements.
    pub fn count(&self) -> usize {
        self.data.len()
    }

    /// Number of elements spanned by the axes from `start_axis` onward.
    pub fn count_from(&self, start_axis: usize) -> usize {
        self.shape.iter().skip(start_axis).product()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn map<F>(&self, functor: F) -> Tensor
    where
        F: Fn(f64) -> f64,
    {
        Tensor {
            shape: self.shape.clone(),
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }
}

impl Default for Tensor {
    fn default() -> Self {
        Tensor { shape: vec![0], data: vec![] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_follow_shape() {
        let t = Tensor::zeros(&[2, 3, 4]);
        assert_eq!(t.count(), 24);
        assert_eq!(t.count_from(1), 12);
        assert_eq!(t.count_from(3), 1);
        assert_eq!(t.dim(1), Some(3));
        assert_eq!(t.dim(3), None);
    }

    #[test]
    fn scalar_has_no_axes() {
        let s = Tensor::scalar(1.5);
        assert_eq!(s.num_axes(), 0);
        assert_eq!(s.count(), 1);
        assert_eq!(s.data(), &[1.5]);
    }

    #[test]
    fn from_data_rejects_wrong_count() {
        assert!(Tensor::from_data(&[2, 2], vec![1.0; 3]).is_err());
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        assert!(Tensor::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
        let t = Tensor::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(t.shape(), &[2, 2]);
        assert_eq!(t.data(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn reshape_resizes_storage() {
        let mut t = Tensor::from_data(&[2], vec![1.0, 2.0]).unwrap();
        t.reshape(&[2, 2]);
        assert_eq!(t.data(), &[1.0, 2.0, 0.0, 0.0]);
        t.reshape(&[]);
        assert_eq!(t.count(), 1);
    }
}
