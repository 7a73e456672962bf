mod common;

use approx::assert_relative_eq;
use common::{read_columns, run};
use mocksz::{
    constants::{CLIGHT, GHZ_TO_HZ, KM_TO_M, T_CMB},
    kernel::KernelConfig,
    math::{quadrature::QuadratureConfig, romberg::RombergConfig},
    model::{
        iso_beta::{IsoBetaModel, IsoBetaParameters},
        SampleLayout,
    },
    signal::{pointing::tsz_signal, SignalConfig},
};

const FAST_REFINEMENTS: &str = "--max-refinements=8";
const FAST_ROWS: &str = "--max-rows=8";

const CLUSTER: [&str; 5] = [
    "--beta=0.7",
    "--central-density=1e-2",
    "--core-radius=30",
    "--distance=1000",
    "--temperature=5",
];

fn fast_signal_config() -> SignalConfig {
    let mut kernel = KernelConfig::default();
    kernel.mu_quadrature.max_refinements = 8;
    kernel.beta_quadrature.max_refinements = 8;
    SignalConfig {
        kernel,
        romberg: RombergConfig {
            max_rows: 8,
            ..RombergConfig::default()
        },
        kinematic_quadrature: QuadratureConfig::default(),
        ..SignalConfig::default()
    }
}

def_test!(
OUT[output = "cmb.csv"]
fn cmb_brightness_temperature_is_cmb_temperature {
    run([
        "cmb",
        "--frequency-range=1,800",
        "--n-frequencies=17",
        "--unit=k_b",
        &format!("--output-file={}", output),
        "--overwrite",
    ]);
    let columns = read_columns(output);
    assert_eq!(columns.names(), ["frequency", "intensity"]);
    assert_eq!(columns.n_rows(), 17);
    for &temperature in columns.column("intensity") {
        assert_relative_eq!(temperature, T_CMB, max_relative = 1e-9);
    }
});

def_test!(
OUT[si_output = "cmb_si.csv", jy_output = "cmb_jy.csv"]
fn cmb_spectrum_peaks_near_160_ghz {
    for (output, unit) in [(si_output, "si"), (jy_output, "jy")] {
        run([
            "cmb",
            "--frequency-range=100,300",
            "--n-frequencies=21",
            &format!("--unit={}", unit),
            &format!("--output-file={}", output),
            "--overwrite",
        ]);
    }
    let si = read_columns(si_output);
    let jy = read_columns(jy_output);

    let intensities = si.column("intensity");
    let peak_idx = intensities
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
        .map(|(idx, _)| idx)
        .unwrap();
    assert_relative_eq!(si.column("frequency")[peak_idx], 160.0, max_relative = 1e-6);

    for (&intensity_si, &intensity_jy) in intensities.iter().zip(jy.column("intensity")) {
        assert_relative_eq!(intensity_jy, intensity_si * 1e26, max_relative = 1e-6);
    }
});

def_test!(
OUT[output = "maxwell_juttner.csv"]
fn maxwell_juttner_density_is_normalized {
    run([
        "distribution",
        "maxwell_juttner",
        "--temperature=5",
        "--n-betas=2000",
        &format!("--output-file={}", output),
        "--overwrite",
    ]);
    let columns = read_columns(output);
    let betas = columns.column("beta");
    let densities = columns.column("density");
    assert_eq!(betas.len(), 2000);
    assert_eq!(betas[0], 0.0);
    assert!(densities.iter().all(|&density| density >= 0.0));

    let d_beta = betas[1] - betas[0];
    let total: f64 = densities.iter().sum::<f64>() * d_beta;
    assert_relative_eq!(total, 1.0, max_relative = 1e-2);
});

def_test!(
OUT[output = "power_law.csv"]
fn power_law_density_spans_cut_offs {
    run([
        "distribution",
        "power_law",
        "--alpha=2.5",
        "--gamma-range=1,1000",
        "--n-gammas=4",
        &format!("--output-file={}", output),
        "--overwrite",
    ]);
    let columns = read_columns(output);
    let gammas = columns.column("gamma");
    assert_relative_eq!(gammas[0], 1.0);
    assert_relative_eq!(gammas[1], 10.0, max_relative = 1e-9);
    assert_relative_eq!(gammas[3], 1000.0);

    let densities = columns.column("density");
    assert!(densities.windows(2).all(|pair| pair[1] < pair[0]));
    assert_relative_eq!(densities[0] / densities[1], 10.0_f64.powf(2.5), max_relative = 1e-9);
});

def_test!(
OUT[output = "thermal_table.csv"]
fn thermal_kernel_table_is_normalized {
    run([
        "kernel",
        "thermal",
        "--temperature=5",
        "--table",
        FAST_REFINEMENTS,
        FAST_ROWS,
        &format!("--output-file={}", output),
        "--overwrite",
    ]);
    let columns = read_columns(output);
    assert_eq!(columns.names(), ["shift", "kernel"]);
    let shifts = columns.column("shift");
    let values = columns.column("kernel");
    assert!(shifts.windows(2).all(|pair| pair[1] > pair[0]));
    assert!(values.iter().all(|&value| value >= 0.0));

    let total: f64 = shifts
        .windows(2)
        .zip(values.windows(2))
        .map(|(s, p)| 0.5 * (s[1] - s[0]) * (p[0] + p[1]))
        .sum();
    assert_relative_eq!(total, 1.0, max_relative = 2e-2);
});

def_test!(
OUT[output = "single.csv"]
fn single_scattering_kernel_vanishes_outside_accessible_shifts {
    run([
        "kernel",
        "single",
        "--beta=0.2",
        "--shift-range=-1,1",
        "--n-shifts=21",
        FAST_REFINEMENTS,
        &format!("--output-file={}", output),
        "--overwrite",
    ]);
    let columns = read_columns(output);
    let max_shift = f64::ln(1.2 / 0.8);
    for (&shift, &value) in columns.column("shift").iter().zip(columns.column("kernel")) {
        if shift.abs() > max_shift {
            assert_eq!(value, 0.0);
        } else if shift.abs() < 0.5 * max_shift {
            assert!(value > 0.0);
        }
    }
});

def_test!(
OUT[output = "tsz.csv"]
fn tsz_signal_changes_sign_across_null {
    run([
        "signal",
        "tsz",
        "--temperature=5",
        "--optical-depth=1e-2",
        "--frequency-range=50,400",
        "--n-frequencies=2",
        FAST_REFINEMENTS,
        FAST_ROWS,
        &format!("--output-file={}", output),
        "--overwrite",
    ]);
    let intensities = read_columns(output).column("intensity").to_vec();
    assert!(intensities[0] < 0.0);
    assert!(intensities[1] > 0.0);
});

def_test!(
OUT[thin = "thin.csv", thick = "thick.csv"]
fn tsz_signal_scales_with_optical_depth {
    for (output, optical_depth) in [(thin, "1e-3"), (thick, "2e-3")] {
        run([
            "signal",
            "tsz",
            "--temperature=8",
            &format!("--optical-depth={}", optical_depth),
            "--frequency-range=100,300",
            "--n-frequencies=3",
            FAST_REFINEMENTS,
            FAST_ROWS,
            &format!("--output-file={}", output),
            "--overwrite",
        ]);
    }
    let thin = read_columns(thin);
    let thick = read_columns(thick);
    for (&thin, &thick) in thin.column("intensity").iter().zip(thick.column("intensity")) {
        assert_relative_eq!(thick, 2.0 * thin, max_relative = 1e-9);
    }
});

def_test!(
OUT[output = "ksz.csv"]
fn first_order_ksz_is_uniform_temperature_shift {
    run([
        "signal",
        "ksz",
        "--velocity=500",
        "--optical-depth=1e-2",
        "--frequency-range=30,600",
        "--n-frequencies=5",
        "--unit=k_cmb",
        &format!("--output-file={}", output),
        "--overwrite",
    ]);
    let expected = -1e-2 * T_CMB * 500.0 * KM_TO_M / CLIGHT;
    for &temperature_change in read_columns(output).column("intensity") {
        assert_relative_eq!(temperature_change, expected, max_relative = 1e-9);
    }
});

def_test!(
OUT[output = "map.csv"]
fn tsz_map_peaks_at_cluster_center {
    let output_arg = format!("--output-file={}", output);
    let mut args = vec![
        "map",
        "--quantity=tsz",
        "--az-range=-60,60",
        "--el-range=-60,60",
        "--shape=3,3",
        "--frequency-range=100,150",
        "--n-frequencies=2",
        FAST_REFINEMENTS,
        FAST_ROWS,
        &output_arg,
        "--overwrite",
    ];
    args.extend(CLUSTER);
    run(args);

    let columns = read_columns(output);
    assert_eq!(columns.names(), ["azimuth", "elevation", "frequency", "intensity"]);
    assert_eq!(columns.n_rows(), 18);

    let azimuths = columns.column("azimuth");
    let elevations = columns.column("elevation");
    let intensities = columns.column("intensity");
    assert!(intensities.iter().all(|&intensity| intensity < 0.0));

    let strongest = (0..columns.n_rows())
        .max_by(|&a, &b| intensities[b].partial_cmp(&intensities[a]).unwrap())
        .unwrap();
    assert_eq!(azimuths[strongest], 0.0);
    assert_eq!(elevations[strongest], 0.0);
});

def_test!(
OUT[output = "trace.csv"]
fn traced_optical_depth_is_symmetric {
    let output_arg = format!("--output-file={}", output);
    let mut args = vec![
        "map",
        "--quantity=optical_depth",
        "--layout=trace",
        "--az-range=-40,40",
        "--el-range=-40,40",
        "--shape=5,5",
        &output_arg,
        "--overwrite",
    ];
    args.extend(CLUSTER);
    run(args);

    let columns = read_columns(output);
    assert_eq!(columns.names(), ["azimuth", "elevation", "optical_depth"]);
    let optical_depths = columns.column("optical_depth");
    assert_eq!(optical_depths.len(), 5);
    assert_relative_eq!(optical_depths[0], optical_depths[4], max_relative = 1e-12);
    assert_relative_eq!(optical_depths[1], optical_depths[3], max_relative = 1e-12);
    assert!(optical_depths[2] > optical_depths[1]);

    let central_optical_depth = IsoBetaParameters {
        beta: 0.7,
        central_density: 1e-2,
        core_radius: 30.0,
        angular_diameter_distance: 1000.0,
    }
    .central_optical_depth();
    assert_relative_eq!(optical_depths[2], central_optical_depth, max_relative = 1e-12);
});

def_test!(
OUT[output = "pixel.csv"]
fn single_map_sample_is_at_range_midpoint {
    let output_arg = format!("--output-file={}", output);
    let mut args = vec![
        "map",
        "--quantity=optical_depth",
        "--az-range=10,30",
        "--el-range=-5,-5",
        "--shape=1,1",
        &output_arg,
        "--overwrite",
    ];
    args.extend(CLUSTER);
    run(args);

    let columns = read_columns(output);
    assert_eq!(columns.column("azimuth"), [20.0]);
    assert_eq!(columns.column("elevation"), [-5.0]);
});

#[test]
fn central_pixel_of_tsz_map_matches_line_of_sight_signal() {
    let parameters = IsoBetaParameters {
        beta: 0.8,
        central_density: 5e-3,
        core_radius: 45.0,
        angular_diameter_distance: 700.0,
    };
    let central_optical_depth = parameters.central_optical_depth();
    let config = fast_signal_config();
    let frequencies = [90.0 * GHZ_TO_HZ, 350.0 * GHZ_TO_HZ];

    let model = IsoBetaModel::new(6.0, 0.0, parameters, config.clone()).unwrap();
    let map = model
        .tsz_map(&[0.0], &[0.0], SampleLayout::Grid, &frequencies)
        .unwrap();
    assert_eq!(map.shape(), &[1, 1, 2]);

    let signal = tsz_signal(&frequencies, 6.0, central_optical_depth, &config).unwrap();
    for (idx, &expected) in signal.iter().enumerate() {
        assert_relative_eq!(map[&[0, 0, idx][..]], expected, max_relative = 1e-10);
    }
}

#[cfg(feature = "json")]
def_test!(
OUT[output = "map.json"]
fn json_map_output_holds_array_and_samples {
    let output_arg = format!("--output-file={}", output);
    let mut args = vec![
        "map",
        "--quantity=optical_depth",
        "--az-range=-30,30",
        "--el-range=0,10",
        "--shape=3,2",
        &output_arg,
        "--overwrite",
    ];
    args.extend(CLUSTER);
    run(args);

    let text = std::fs::read_to_string(output).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["layout"], "grid");
    assert_eq!(value["azimuths"].as_array().unwrap().len(), 3);
    assert_eq!(value["elevations"].as_array().unwrap().len(), 2);
    assert!(value["frequencies"].is_null());
    assert_eq!(value["values"]["dim"], serde_json::json!([3, 2]));
});
