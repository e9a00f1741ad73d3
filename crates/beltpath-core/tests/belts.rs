//! Worked belts: a tensioned drive and an eight pulley serpentine.

use approx::assert_abs_diff_eq;
use beltpath_core::{Belt, Direction, ForceOptions, Pulley};

const BELT_PITCH: f64 = 11.0;

fn toothed(teeth: u32, x: f64, y: f64, dir: &str) -> Pulley {
    let dir = dir.parse::<Direction>().expect("direction");
    Pulley::new(Pulley::pitch_radius(teeth, BELT_PITCH), x, y, dir).expect("pulley")
}

#[test]
fn tensioned_drive() {
    // units are mm, N and N·mm
    let driver = toothed(36, 440.0, 0.0, "CW").with_torque(75.0 * 1000.0).unwrap();
    let idler = Pulley::new(25.0, 340.0, -25.0, "CCW".parse().unwrap())
        .and_then(|p| p.with_torque(10.0))
        .unwrap();
    let mut belt = Belt::new(
        vec![toothed(19, 0.0, 0.0, "CW"), driver, idler],
        ForceOptions::with_tensioner(0, 2, 12.0),
    )
    .expect("belt");

    assert_abs_diff_eq!(belt.total_length(), 1207.308_525, epsilon = 1e-5);
    let wraps: Vec<f64> = belt.geometry().segments().iter().map(|s| s.wrap_angle).collect();
    assert_abs_diff_eq!(wraps[0], 3.172_247, epsilon = 1e-5);
    assert_abs_diff_eq!(wraps[1], 3.987_877, epsilon = 1e-5);
    assert_abs_diff_eq!(wraps[2], 0.876_939, epsilon = 1e-5);

    let forces = belt.forces().expect("forces").clone();
    let r_out = Pulley::pitch_radius(19, BELT_PITCH);
    let r_in = Pulley::pitch_radius(36, BELT_PITCH);
    // the output pulley reacts the driver torque less the idler drag
    let expected = -(75_000.0 / r_in - 10.0 / 25.0) * r_out;
    assert_abs_diff_eq!(forces.solved_torque(), expected, epsilon = 1e-6);

    let t: Vec<f64> = forces.segments().iter().map(|s| s.local_tension).collect();
    assert_abs_diff_eq!((t[1] + t[2]) / 2.0, 12.0, epsilon = 1e-9);
    assert!(t[0] > 1000.0, "tight side carries the drive: {t:?}");

    // the reaction on every pulley is bounded by the two tensions meeting there
    for (i, seg) in forces.segments().iter().enumerate() {
        let incoming = t[(i + 2) % 3];
        assert!(seg.reaction_force <= incoming + t[i] + 1e-9);
        assert!(seg.reaction_force >= (incoming - t[i]).abs() - 1e-9);
    }
}

#[test]
fn serpentine_with_minimum_tension() {
    let pulleys = vec![
        toothed(19, 0.0, 0.0, "CW"),
        toothed(36, 440.0, 0.0, "CCW"),
        toothed(18, 440.0, -440.0, "CW"),
        toothed(11, 0.0, -440.0, "CW"),
        toothed(18, 220.0, -220.0, "CCW"),
        toothed(24, 200.0, 50.0, "CW"),
        toothed(18, 100.0, -300.0, "CCW"),
        toothed(36, -40.0, -620.0, "CW"),
    ];
    let mut belt = Belt::new(pulleys, ForceOptions::with_min_tension(0, 100.0)).expect("belt");
    belt.set_force_scale(1.0).unwrap();
    belt.set_torque_scale(0.01).unwrap();

    assert_abs_diff_eq!(belt.total_length(), 4080.333_307, epsilon = 1e-5);

    let seg = belt.segment_geometry(0).unwrap();
    assert_abs_diff_eq!(seg.c2c_length, 440.0, epsilon = 1e-12);
    assert_abs_diff_eq!(seg.wrap_angle, 1.6791, epsilon = 1e-4);

    // no torque anywhere: the whole belt sits at the minimum tension
    let forces = belt.forces().unwrap();
    assert_abs_diff_eq!(forces.solved_torque(), 0.0, epsilon = 1e-12);
    for seg in forces.segments() {
        assert_abs_diff_eq!(seg.local_tension, 100.0, epsilon = 1e-12);
    }
}
