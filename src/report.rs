use shearbox::{CurveFrame, FailureEnvelope, MarkerKind, SimulationFrame, SimulationParameters};
use std::fmt::Write;

/// Render a textual summary of a replayed direct shear session.
///
/// The report lists the failure envelope first and then every visible curve
/// with the markers the cursor has reached, so the numbers can be compared
/// with a hand-drawn Mohr-Coulomb plot
/// (<https://en.wikipedia.org/wiki/Mohr%E2%80%93Coulomb_theory>).
#[must_use]
pub fn render_summary(frame: &SimulationFrame, parameters: &SimulationParameters) -> String {
    let mut output = String::new();

    let strain = frame
        .curves
        .first()
        .and_then(|curve| curve.strain.last().copied())
        .unwrap_or(0.0);
    writeln!(
        &mut output,
        "Direct shear replay (cursor = {}, strain = {strain:.3}, box offset = {:.2})",
        frame.state.cursor, frame.shear_box_displacement
    )
    .expect("writing to string cannot fail");

    // The envelope is absent only on the blank frame that follows a reset.
    match &frame.envelope {
        Some(geometry) => {
            let envelope = FailureEnvelope::from(parameters);
            writeln!(&mut output, "Failure envelope: {envelope}")
                .expect("writing to string cannot fail");
            for point in &geometry.points {
                writeln!(
                    &mut output,
                    "  σ = {:7.1} kPa -> τf = {:7.2} kPa",
                    point.normal_stress, point.shear_stress
                )
                .expect("writing to string cannot fail");
            }
        }
        None => output.push_str("Failure envelope: cleared\n"),
    }

    if frame.curves.is_empty() {
        output.push_str("No curves selected\n");
    }
    for curve in &frame.curves {
        render_curve(&mut output, curve);
    }

    output
}

fn render_curve(output: &mut String, curve: &CurveFrame) {
    let shear = curve.shear_stress.last().copied().unwrap_or(0.0);
    let height = curve.height_change.last().copied().unwrap_or(0.0);
    writeln!(
        output,
        "{} ({}), σ{} = {:.1} kPa: τ = {shear:.2} kPa, Δh = {height:+.3}",
        curve.soil.description(),
        curve.soil,
        curve.slot,
        curve.normal_stress
    )
    .expect("writing to string cannot fail");

    for marker in &curve.markers {
        let (name, value) = match marker.kind {
            MarkerKind::Peak => ("peak", format!("τ = {:.2} kPa", marker.shear_stress)),
            MarkerKind::CriticalState => {
                ("critical state", format!("Δh = {:+.3}", marker.height_change))
            }
        };
        writeln!(
            output,
            "  [{}] {name} at strain {:.3}: {value}",
            marker.label, marker.strain
        )
        .expect("writing to string cannot fail");
    }
}
