use log::{info, LevelFilter};
use mechanics::tire::{longitudinal_force, pacejka_lateral_force};
use mechanics::{compute_tire_forces, TireParameters, VehicleParameters};
use plotters::prelude::*;
use simcore::{ControlInput, VehicleState};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

fn draw_series(
    filename: &str,
    title: &str,
    x_label: &str,
    y_label: &str,
    series: &[(&str, RGBColor, Vec<(f64, f64)>)],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(filename, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let points = series.iter().flat_map(|(_, _, pts)| pts.iter());
    let (x_min, x_max, y_min, y_max) = points.fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(x0, x1, y0, y1), &(x, y)| (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
    );

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("Arial", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart.configure_mesh().x_desc(x_label).y_desc(y_label).draw()?;

    for (label, color, pts) in series {
        let color = *color;
        chart
            .draw_series(LineSeries::new(pts.iter().cloned(), &color))?
            .label(*label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.filled()));
    }

    chart.configure_series_labels().border_style(&BLACK).draw()?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    TermLogger::init(LevelFilter::Info, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;

    let vehicle = VehicleParameters::default();
    let tire = TireParameters::default();

    // 1) Lateral force vs slip angle for each axle
    let mut front = Vec::new();
    let mut rear = Vec::new();
    for alpha_deg in (-150..=150).map(|d| d as f64 * 0.1) {
        let alpha = alpha_deg.to_radians();
        front.push((
            alpha_deg,
            pacejka_lateral_force(alpha, tire.front_peak, tire.front_shape, tire.front_stiffness),
        ));
        rear.push((
            alpha_deg,
            pacejka_lateral_force(alpha, tire.rear_peak, tire.rear_shape, tire.rear_stiffness),
        ));
    }

    draw_series(
        "lateral_vs_slip_angle.png",
        "Lateral Force vs Slip Angle",
        "Slip Angle [deg]",
        "Lateral Force Fy [N]",
        &[("front", BLUE, front), ("rear", RED, rear)],
    )?;

    // 2) Net longitudinal force vs speed at fixed drive commands
    let series: Vec<_> = [("drive 0 N", 0.0, BLACK), ("drive 500 N", 500.0, BLUE), ("drive 1000 N", 1000.0, RED)]
        .into_iter()
        .map(|(label, drive_force, color)| {
            let pts: Vec<(f64, f64)> = (1..=40)
                .map(|v| v as f64)
                .map(|vx| (vx, longitudinal_force(drive_force, vx, &tire)))
                .collect();
            (label, color, pts)
        })
        .collect();

    draw_series(
        "longitudinal_vs_speed.png",
        "Net Longitudinal Force vs Speed",
        "vx [m/s]",
        "Fx [N]",
        &series,
    )?;

    // Steady steer at 15 m/s for reference
    let state = VehicleState {
        vx: 15.0,
        steer_angle: 0.05,
        ..Default::default()
    };
    let forces = compute_tire_forces(&state, &ControlInput::new(500.0, 0.0), &vehicle, &tire);
    info!("Forces at vx=15 m/s, steer=0.05 rad: {:?}", forces);

    info!("Wrote plots: lateral_vs_slip_angle.png, longitudinal_vs_speed.png");

    Ok(())
}
