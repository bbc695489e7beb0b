use approx::assert_abs_diff_eq;
use ndarray::{array, s, Array3, Axis};
use social_context::{nearest_neighbour_indices, Trajectories};

fn line_abreast(frames: usize) -> Trajectories {
    // Five individuals side by side, moving along x at different speeds.
    let s = Array3::from_shape_fn((frames, 5, 2), |(t, i, c)| {
        if c == 0 {
            t as f64 * (1.0 + 0.1 * i as f64)
        } else {
            i as f64
        }
    });
    let v = Array3::from_shape_fn((frames, 5, 2), |(_, i, c)| {
        if c == 0 {
            1.0 + 0.1 * i as f64
        } else {
            0.0
        }
    });
    let a = Array3::zeros((frames, 5, 2));
    Trajectories::from_kinematics(s, v, a).unwrap()
}

#[test]
fn test_center_of_mass_equals_mean_over_individuals() {
    let trajectories = line_abreast(12);
    let com = trajectories.center_of_mass();

    assert_eq!(com.s, trajectories.s().mean_axis(Axis(1)).unwrap());
    assert_eq!(com.v, trajectories.v().mean_axis(Axis(1)).unwrap());
    assert_eq!(com.a, trajectories.a().mean_axis(Axis(1)).unwrap());
    assert_abs_diff_eq!(com.v[[3, 0]], 1.2, epsilon = 1e-12);
    assert_abs_diff_eq!(com.s[[0, 1]], 2.0, epsilon = 1e-12);
}

#[test]
fn test_slice_then_center_of_mass() {
    let trajectories = line_abreast(20);
    let sliced = trajectories.slice(4..9).unwrap();

    assert_eq!(sliced.number_of_frames(), 5);
    assert_eq!(sliced.number_of_individuals(), 5);
    assert_eq!(sliced.number_of_dimensions(), 2);
    assert_eq!(
        sliced.center_of_mass().s,
        trajectories.center_of_mass().s.slice(s![4..9, ..])
    );
}

#[test]
fn test_orientation_of_parallel_movers() {
    let trajectories = line_abreast(3);
    let orientation = trajectories.orientation();
    for heading in orientation.lanes(Axis(2)) {
        assert_abs_diff_eq!(heading[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(heading[1], 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_nearest_neighbours_of_a_line() {
    let trajectories = line_abreast(1);
    let indices = nearest_neighbour_indices(trajectories.s(), 2).unwrap();
    // At t = 0 everyone sits on the y axis one unit apart.
    assert_eq!(
        indices.index_axis(Axis(0), 0),
        array![[1_usize, 2], [0, 2], [1, 3], [2, 4], [3, 2]]
    );
}
