//! Tabulated laboratory responses used in place of the closed-form model.
//!
//! Tables are semicolon-separated with the header
//! `H_disp;SS_L;SS_D;Vd_L;Vd_D`: normalised horizontal displacement, loose and
//! dense shear stress, loose and dense height change. Values are linearly
//! interpolated onto the simulation's strain axis and held constant past
//! either end of the table.

use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::errors::ReferenceDataError;
use crate::model::{ResponseCurve, ResponseSource};
use crate::soil::SoilClass;
use crate::strain::StrainAxis;

/// One data row of a reference table.
#[derive(Debug, Deserialize)]
struct ReferenceRow {
    /// Normalised horizontal displacement.
    #[serde(rename = "H_disp")]
    strain: f64,
    /// Loose soil shear stress.
    #[serde(rename = "SS_L")]
    loose_shear: f64,
    /// Dense soil shear stress.
    #[serde(rename = "SS_D")]
    dense_shear: f64,
    /// Loose soil height change.
    #[serde(rename = "Vd_L")]
    loose_height: f64,
    /// Dense soil height change.
    #[serde(rename = "Vd_D")]
    dense_height: f64,
}

impl ReferenceRow {
    /// Returns `true` when no cell holds NaN or an infinity.
    fn is_finite(&self) -> bool {
        [
            self.strain,
            self.loose_shear,
            self.dense_shear,
            self.loose_height,
            self.dense_height,
        ]
        .iter()
        .all(|value| value.is_finite())
    }
}

/// Measured shear and height-change series for both soil classes.
///
/// The recorded series do not depend on the normal stress; every stress slot
/// replays the same measurement.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceTable {
    /// Strictly increasing strain samples.
    strain: Vec<f64>,
    /// Dense shear stress per sample.
    dense_shear: Vec<f64>,
    /// Dense height change per sample.
    dense_height: Vec<f64>,
    /// Loose shear stress per sample.
    loose_shear: Vec<f64>,
    /// Loose height change per sample.
    loose_height: Vec<f64>,
}

impl ReferenceTable {
    /// Read a table from any byte stream.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceDataError`] when the stream is not a well-formed
    /// table, is empty, holds non-finite values or its strain column does not
    /// increase strictly.
    ///
    /// # Examples
    /// ```
    /// use shearbox::ReferenceTable;
    ///
    /// let data = "H_disp;SS_L;SS_D;Vd_L;Vd_D\n0.0;0.0;0.0;0.0;0.0\n1.0;0.6;0.7;-0.8;0.3\n";
    /// let table = ReferenceTable::from_reader(data.as_bytes()).expect("valid table");
    /// assert_eq!(table.len(), 2);
    /// ```
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, ReferenceDataError> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::from_csv(reader)
    }

    /// Read a table from a file.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ReferenceTable::from_reader`], plus I/O failures
    /// opening the file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReferenceDataError> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::from_csv(reader)
    }

    /// Decode and validate every row of an opened table.
    fn from_csv<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Self, ReferenceDataError> {
        let mut table = Self {
            strain: Vec::new(),
            dense_shear: Vec::new(),
            dense_height: Vec::new(),
            loose_shear: Vec::new(),
            loose_height: Vec::new(),
        };
        for (row, record) in reader.deserialize::<ReferenceRow>().enumerate() {
            let record = record?;
            if !record.is_finite() {
                return Err(ReferenceDataError::NonFinite { row });
            }
            if let Some(&previous) = table.strain.last() {
                if record.strain <= previous {
                    return Err(ReferenceDataError::NonIncreasingStrain {
                        row,
                        value: record.strain,
                    });
                }
            }
            table.strain.push(record.strain);
            table.dense_shear.push(record.dense_shear);
            table.dense_height.push(record.dense_height);
            table.loose_shear.push(record.loose_shear);
            table.loose_height.push(record.loose_height);
        }
        if table.strain.is_empty() {
            return Err(ReferenceDataError::Empty);
        }
        Ok(table)
    }

    /// Number of tabulated samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strain.len()
    }

    /// Returns `true` when the table holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strain.is_empty()
    }

    /// Tabulated strain samples.
    #[must_use]
    pub fn strain(&self) -> &[f64] {
        &self.strain
    }

    /// Tabulated `(shear stress, height change)` of `soil` at sample `index`.
    #[must_use]
    pub fn sample(&self, soil: SoilClass, index: usize) -> Option<(f64, f64)> {
        let (shear, height) = self.columns(soil);
        Some((*shear.get(index)?, *height.get(index)?))
    }

    /// Shear and height columns of `soil`.
    fn columns(&self, soil: SoilClass) -> (&[f64], &[f64]) {
        match soil {
            SoilClass::Dense => (self.dense_shear.as_slice(), self.dense_height.as_slice()),
            SoilClass::Loose => (self.loose_shear.as_slice(), self.loose_height.as_slice()),
        }
    }
}

impl ResponseSource for ReferenceTable {
    fn response(&self, soil: SoilClass, normal_stress: f64, axis: &StrainAxis) -> ResponseCurve {
        let (shear, height) = self.columns(soil);
        let strain = axis.values();
        ResponseCurve {
            soil,
            normal_stress,
            shear_stress: strain.mapv(|eps| interpolate(&self.strain, shear, eps)),
            height_change: strain.mapv(|eps| interpolate(&self.strain, height, eps)),
        }
    }
}

/// Piecewise-linear lookup of `x` in the strictly increasing `xs`.
fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let upper = xs.partition_point(|&value| value <= x);
    if upper == 0 {
        return ys[0];
    }
    if upper == xs.len() {
        return ys[xs.len() - 1];
    }
    let (x0, x1) = (xs[upper - 1], xs[upper]);
    let (y0, y1) = (ys[upper - 1], ys[upper]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const TABLE: &str = "H_disp;SS_L;SS_D;Vd_L;Vd_D
0.0;0.0;0.0;0.0;0.0
0.5;0.4;0.8;-0.5;0.2
1.0;0.6;0.6;-0.8;0.3
";

    fn table() -> ReferenceTable {
        ReferenceTable::from_reader(TABLE.as_bytes()).expect("valid table")
    }

    #[test]
    fn reads_columns_by_soil_class() {
        let table = table();
        assert_eq!(table.len(), 3);
        assert_eq!(table.sample(SoilClass::Dense, 1), Some((0.8, 0.2)));
        assert_eq!(table.sample(SoilClass::Loose, 2), Some((0.6, -0.8)));
        assert_eq!(table.sample(SoilClass::Loose, 3), None);
    }

    #[test]
    fn interpolates_onto_strain_axis() {
        let table = table();
        let axis = StrainAxis::new(100.0, 5);
        let curve = table.response(SoilClass::Dense, 100.0, &axis);
        assert_eq!(curve.len(), 5);
        assert_relative_eq!(curve.shear_stress[1], 0.4, epsilon = 1.0e-12);
        assert_relative_eq!(curve.shear_stress[2], 0.8, epsilon = 1.0e-12);
        assert_relative_eq!(curve.height_change[3], 0.25, epsilon = 1.0e-12);
        assert_relative_eq!(curve.height_change[4], 0.3, epsilon = 1.0e-12);
    }

    #[test]
    fn holds_end_values_outside_table() {
        let table = table();
        let axis = StrainAxis::new(200.0, 3);
        let curve = table.response(SoilClass::Loose, 50.0, &axis);
        assert_eq!(curve.shear_stress[2], 0.6);
        assert_eq!(curve.height_change[2], -0.8);
    }

    #[test]
    fn rejects_malformed_tables() {
        let empty = ReferenceTable::from_reader("H_disp;SS_L;SS_D;Vd_L;Vd_D\n".as_bytes());
        assert!(matches!(empty, Err(ReferenceDataError::Empty)));

        let unordered = "H_disp;SS_L;SS_D;Vd_L;Vd_D\n0.0;0;0;0;0\n0.0;1;1;1;1\n";
        assert!(matches!(
            ReferenceTable::from_reader(unordered.as_bytes()),
            Err(ReferenceDataError::NonIncreasingStrain { row: 1, .. })
        ));

        let infinite = "H_disp;SS_L;SS_D;Vd_L;Vd_D\n0.0;0;inf;0;0\n";
        assert!(matches!(
            ReferenceTable::from_reader(infinite.as_bytes()),
            Err(ReferenceDataError::NonFinite { row: 0 })
        ));

        let missing = "H_disp;SS_L\n0.0;0.0\n";
        assert!(matches!(
            ReferenceTable::from_reader(missing.as_bytes()),
            Err(ReferenceDataError::Csv(_))
        ));
    }
}
