//! Marker detection on response curves during playback.
//!
//! Markers are derived every frame from the full curve and the playback
//! cursor; nothing is stored between frames.

use serde::{Deserialize, Serialize};

use crate::model::{stable_argmax, ResponseCurve};

/// Kind of event a marker flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Maximum shear stress.
    Peak,
    /// Volumetric response has settled.
    CriticalState,
}

impl MarkerKind {
    /// Short label drawn next to the marker.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            MarkerKind::Peak => "P",
            MarkerKind::CriticalState => "CS",
        }
    }
}

/// A flagged sample of a response curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Marker {
    /// Index into the strain axis.
    pub strain_index: usize,
    /// What the marker flags.
    pub kind: MarkerKind,
    /// Text drawn next to the marker.
    pub label: &'static str,
}

impl Marker {
    /// Create a marker of `kind` at `strain_index`.
    #[must_use]
    pub const fn new(strain_index: usize, kind: MarkerKind) -> Self {
        Self {
            strain_index,
            kind,
            label: kind.label(),
        }
    }
}

/// How the critical state of a curve is located.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalStateRule {
    /// Largest signed height change, first occurrence on ties.
    #[default]
    MaxHeightChange,
    /// Largest height-change magnitude, so compressive curves mark their most
    /// compressed sample.
    MaxHeightMagnitude,
    /// Final sample, once playback reaches it.
    SeriesEnd,
}

/// Locate the peak shear stress, if the visible prefix `[0, cursor]` reaches it.
///
/// The search always runs over the full curve, so the marker shows up the
/// frame the cursor arrives at the true maximum and stays afterwards.
///
/// # Examples
/// ```
/// use shearbox::{find_peak, ConstitutiveModel, SoilClass, StrainAxis};
///
/// let axis = StrainAxis::new(100.0, 100);
/// let curve = ConstitutiveModel::default().compute(SoilClass::Dense, 100.0, &axis);
/// assert!(find_peak(&curve, 10).is_none());
/// assert_eq!(find_peak(&curve, 60).map(|marker| marker.strain_index), Some(19));
/// ```
#[must_use]
pub fn find_peak(curve: &ResponseCurve, cursor: usize) -> Option<Marker> {
    stable_argmax(curve.shear_stress.iter().copied())
        .filter(|&index| index <= cursor)
        .map(|index| Marker::new(index, MarkerKind::Peak))
}

/// Locate the critical state according to `rule`.
///
/// With [`CriticalStateRule::MaxHeightChange`] and
/// [`CriticalStateRule::MaxHeightMagnitude`] the marker follows the same
/// visibility rule as [`find_peak`]. With [`CriticalStateRule::SeriesEnd`] it
/// sits on the last sample and only appears once `cursor` has reached it.
#[must_use]
pub fn find_critical_state(
    curve: &ResponseCurve,
    cursor: usize,
    rule: CriticalStateRule,
) -> Option<Marker> {
    let index = match rule {
        CriticalStateRule::MaxHeightChange => stable_argmax(curve.height_change.iter().copied())?,
        CriticalStateRule::MaxHeightMagnitude => {
            stable_argmax(curve.height_change.iter().map(|height| height.abs()))?
        }
        CriticalStateRule::SeriesEnd => curve.len().checked_sub(1)?,
    };
    (index <= cursor).then(|| Marker::new(index, MarkerKind::CriticalState))
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::soil::SoilClass;

    fn curve(shear_stress: ndarray::Array1<f64>, height_change: ndarray::Array1<f64>) -> ResponseCurve {
        ResponseCurve {
            soil: SoilClass::Dense,
            normal_stress: 100.0,
            shear_stress,
            height_change,
        }
    }

    #[test]
    fn peak_appears_once_cursor_covers_argmax() {
        let curve = curve(
            array![0.0, 2.0, 5.0, 4.0, 3.0],
            array![0.0, 0.1, 0.2, 0.3, 0.3],
        );
        for cursor in 0..2 {
            assert_eq!(find_peak(&curve, cursor), None);
        }
        for cursor in 2..8 {
            assert_eq!(find_peak(&curve, cursor), Some(Marker::new(2, MarkerKind::Peak)));
        }
    }

    #[test]
    fn peak_ties_resolve_to_first_index() {
        let curve = curve(array![1.0, 4.0, 4.0, 2.0], array![0.0, 0.0, 0.0, 0.0]);
        assert_eq!(find_peak(&curve, 3).map(|m| m.strain_index), Some(1));
    }

    #[test]
    fn critical_state_tracks_largest_height_change() {
        let curve = curve(
            array![0.0, 1.0, 1.0, 1.0, 1.0],
            array![0.0, 0.2, 0.4, 0.4, 0.3],
        );
        let rule = CriticalStateRule::MaxHeightChange;
        assert_eq!(find_critical_state(&curve, 1, rule), None);
        let marker = find_critical_state(&curve, 2, rule).expect("visible");
        assert_eq!(marker.strain_index, 2);
        assert_eq!(marker.label, "CS");
    }

    #[test]
    fn compressive_curves_mark_first_sample_by_default() {
        let curve = curve(
            array![0.0, 1.0, 2.0, 3.0],
            array![0.0, -0.3, -0.5, -0.6],
        );
        let marker = find_critical_state(&curve, 0, CriticalStateRule::default());
        assert_eq!(marker.map(|m| m.strain_index), Some(0));
    }

    #[test]
    fn magnitude_rule_marks_most_compressed_sample() {
        let curve = curve(
            array![0.0, 1.0, 2.0, 3.0],
            array![0.0, -0.3, -0.5, -0.6],
        );
        let rule = CriticalStateRule::MaxHeightMagnitude;
        assert_eq!(find_critical_state(&curve, 2, rule), None);
        let marker = find_critical_state(&curve, 3, rule);
        assert_eq!(marker.map(|m| m.strain_index), Some(3));
    }

    #[test]
    fn loose_model_curve_marks_start_of_test() {
        use crate::model::ConstitutiveModel;
        use crate::strain::StrainAxis;

        let axis = StrainAxis::new(100.0, 100);
        let curve = ConstitutiveModel::default().compute(SoilClass::Loose, 100.0, &axis);
        let marker = find_critical_state(&curve, 99, CriticalStateRule::MaxHeightChange)
            .expect("visible");
        assert_eq!(marker.strain_index, 0);
        assert_eq!(curve.height_change[0], 0.0);
    }

    #[test]
    fn series_end_rule_waits_for_last_sample() {
        let curve = curve(array![0.0, 1.0, 2.0], array![0.0, 0.5, 0.1]);
        let rule = CriticalStateRule::SeriesEnd;
        assert_eq!(find_critical_state(&curve, 1, rule), None);
        assert_eq!(
            find_critical_state(&curve, 2, rule),
            Some(Marker::new(2, MarkerKind::CriticalState))
        );
    }

    #[test]
    fn empty_curves_have_no_markers() {
        let curve = curve(ndarray::Array1::zeros(0), ndarray::Array1::zeros(0));
        assert_eq!(find_peak(&curve, 0), None);
        assert_eq!(find_critical_state(&curve, 0, CriticalStateRule::SeriesEnd), None);
    }
}
