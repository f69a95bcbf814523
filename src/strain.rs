//! The shared strain axis every response curve is sampled on.

use ndarray::{s, Array1, ArrayView1};

/// Length that converts a horizontal displacement into a strain.
pub const REFERENCE_LENGTH: f64 = 100.0;

/// Ordered, evenly spaced strain samples starting at zero.
///
/// The axis is built once from a displacement range and a sample count and is
/// read-only afterwards; all curves produced for a session are index-aligned
/// with it.
#[derive(Clone, Debug, PartialEq)]
pub struct StrainAxis {
    /// Strain value of every sample.
    values: Array1<f64>,
}

impl StrainAxis {
    /// Sample `samples` strains evenly over `[0, displacement_range]`
    /// displacement, each divided by [`REFERENCE_LENGTH`].
    ///
    /// At least two samples are always produced. A negative or non-finite
    /// range collapses to zero.
    ///
    /// # Examples
    /// ```
    /// use shearbox::StrainAxis;
    ///
    /// let axis = StrainAxis::new(100.0, 101);
    /// assert_eq!(axis.len(), 101);
    /// assert_eq!(axis.strain(0), 0.0);
    /// assert!((axis.strain(100) - 1.0).abs() < 1.0e-12);
    /// ```
    #[must_use]
    pub fn new(displacement_range: f64, samples: usize) -> Self {
        let samples = samples.max(2);
        let range = if displacement_range.is_finite() {
            displacement_range.max(0.0)
        } else {
            0.0
        };
        let values = Array1::linspace(0.0, range, samples) / REFERENCE_LENGTH;
        Self { values }
    }

    /// Number of samples `N`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when the axis holds no samples, which construction rules out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the final sample, `N - 1`.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.values.len() - 1
    }

    /// Strain at sample `index`, clamped to the final sample.
    #[must_use]
    pub fn strain(&self, index: usize) -> f64 {
        self.values[index.min(self.last_index())]
    }

    /// View of every strain sample.
    #[must_use]
    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    /// View of the samples `[0, cursor]`.
    #[must_use]
    pub fn prefix(&self, cursor: usize) -> ArrayView1<'_, f64> {
        let end = cursor.min(self.last_index()) + 1;
        self.values.slice(s![..end])
    }
}
