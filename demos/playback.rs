use shearbox::{
    ControlEvent, MarkerKind, Selection, SessionEvent, Simulation, SimulationConfig,
    SimulationParameters, SoilClass, StressSlot,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut simulation = Simulation::new(SimulationConfig::default());
    simulation.set_parameters(SimulationParameters {
        cohesion: 10.0,
        friction_angle: 34.0,
        ..SimulationParameters::default()
    })?;
    simulation.set_selection(Selection::new(SoilClass::ALL, [StressSlot::Second]));

    let mut frame = simulation.handle(SessionEvent::Control(ControlEvent::Start));
    while frame.timer_enabled {
        frame = simulation.handle(SessionEvent::Control(ControlEvent::Tick));
        for curve in &frame.curves {
            for marker in &curve.markers {
                if marker.strain_index == frame.state.cursor {
                    let value = match marker.kind {
                        MarkerKind::Peak => marker.shear_stress,
                        MarkerKind::CriticalState => marker.height_change,
                    };
                    println!(
                        "{} soil reached {} at strain {:.3} ({value:.3})",
                        curve.soil, marker.label, marker.strain
                    );
                }
            }
        }
    }

    if let Some(envelope) = frame.envelope {
        for point in envelope.points {
            println!(
                "σ = {:.1} kPa -> τf = {:.2} kPa",
                point.normal_stress, point.shear_stress
            );
        }
    }

    Ok(())
}
