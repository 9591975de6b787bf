use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use mdsim::engine::config::{GradientMode, OutputFormat, SimulationConfig};
use nalgebra::Point3;
use std::path::PathBuf;
use std::str::FromStr;

/// Merges command-line flags, the optional config file, and defaults, in
/// that order of precedence.
pub fn build_config(args: &RunArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = match &args.config {
        Some(config_path) => FileConfig::from_file(config_path)?,
        None => FileConfig::default(),
    };
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let sim = file_config.simulation.take().unwrap_or_default();
    let boundary = file_config.boundary.take().unwrap_or_default();
    let output = file_config.output.take().unwrap_or_default();
    let ff = file_config.forcefield.take().unwrap_or_default();

    let gradient_mode = if args.numerical_gradient {
        GradientMode::Numerical
    } else {
        sim.gradient.unwrap_or_default()
    };

    let format = defaults.output_format;
    let output_format = OutputFormat {
        energy_digits: output.energy_digits.unwrap_or(format.energy_digits),
        energy_chars: output.energy_chars.unwrap_or(format.energy_chars),
        geometry_digits: output.geometry_digits.unwrap_or(format.geometry_digits),
        geometry_chars: output.geometry_chars.unwrap_or(format.geometry_chars),
        time_digits: output.time_digits.unwrap_or(format.time_digits),
        time_chars: output.time_chars.unwrap_or(format.time_chars),
    };

    let mut builder = SimulationConfig::builder()
        .input_path(args.input.clone())
        .forcefield_path(args.forcefield.clone().or(ff.path))
        .energy_output(
            args.energy_out
                .clone()
                .or(output.energy)
                .unwrap_or(defaults.energy_output),
        )
        .geometry_output(
            args.geometry_out
                .clone()
                .or(output.geometry)
                .unwrap_or(defaults.geometry_output),
        )
        .desired_temperature(
            args.temperature
                .or(sim.desired_temperature)
                .unwrap_or(defaults.desired_temperature),
        )
        .total_time(
            args.total_time
                .or(sim.total_time)
                .unwrap_or(defaults.total_time),
        )
        .time_step(args.time_step.or(sim.time_step).unwrap_or(defaults.time_step))
        .random_seed(args.seed.or(sim.random_seed).unwrap_or(defaults.random_seed))
        .gradient_mode(gradient_mode)
        .boundary_shape(boundary.shape.unwrap_or(defaults.boundary_shape))
        .boundary_spring(boundary.spring.unwrap_or(defaults.boundary_spring))
        .boundary_extent(boundary.extent.unwrap_or(defaults.boundary_extent))
        .output_format(output_format);

    if let Some([x, y, z]) = boundary.origin {
        builder = builder.boundary_origin(Point3::new(x, y, z));
    }
    if let Some(v) = sim.desired_pressure {
        builder = builder.desired_pressure(v);
    }
    if let Some(v) = sim.energy_wait_time {
        builder = builder.energy_wait_time(v);
    }
    if let Some(v) = sim.geometry_wait_time {
        builder = builder.geometry_wait_time(v);
    }
    if let Some(v) = sim.status_wait_time {
        builder = builder.status_wait_time(v);
    }
    if let Some(v) = sim.equilibration_time {
        builder = builder.equilibration_time(v);
    }
    if let Some(v) = sim.equilibration_rate {
        builder = builder.equilibration_rate(v);
    }
    if let Some(v) = sim.dielectric {
        builder = builder.dielectric(v);
    }
    if let Some(v) = sim.backend {
        builder = builder.backend(v);
    }
    if let Some(v) = sim.infer_bonds {
        builder = builder.infer_bonds(v);
    }

    let simulation = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        source: args.config.clone(),
        simulation,
    })
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

fn parse_origin(key: &str, value: &str) -> Result<[f64; 3]> {
    let parts = value
        .split(',')
        .map(|part| parse_value::<f64>(key, part))
        .collect::<Result<Vec<_>>>()?;
    <[f64; 3]>::try_from(parts).map_err(|_| {
        CliError::Config(format!(
            "Invalid value for {}: '{}'. Expected X,Y,Z.",
            key, value
        ))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "simulation.desired-temperature" => {
                config.simulation.get_or_insert_with(Default::default).desired_temperature =
                    Some(parse_value(key, value)?);
            }
            "simulation.desired-pressure" => {
                config.simulation.get_or_insert_with(Default::default).desired_pressure =
                    Some(parse_value(key, value)?);
            }
            "simulation.total-time" => {
                config.simulation.get_or_insert_with(Default::default).total_time =
                    Some(parse_value(key, value)?);
            }
            "simulation.time-step" => {
                config.simulation.get_or_insert_with(Default::default).time_step =
                    Some(parse_value(key, value)?);
            }
            "simulation.energy-wait-time" => {
                config.simulation.get_or_insert_with(Default::default).energy_wait_time =
                    Some(parse_value(key, value)?);
            }
            "simulation.geometry-wait-time" => {
                config.simulation.get_or_insert_with(Default::default).geometry_wait_time =
                    Some(parse_value(key, value)?);
            }
            "simulation.status-wait-time" => {
                config.simulation.get_or_insert_with(Default::default).status_wait_time =
                    Some(parse_value(key, value)?);
            }
            "simulation.equilibration-time" => {
                config.simulation.get_or_insert_with(Default::default).equilibration_time =
                    Some(parse_value(key, value)?);
            }
            "simulation.equilibration-rate" => {
                config.simulation.get_or_insert_with(Default::default).equilibration_rate =
                    Some(parse_value(key, value)?);
            }
            "simulation.random-seed" => {
                config.simulation.get_or_insert_with(Default::default).random_seed =
                    Some(parse_value(key, value)?);
            }
            "simulation.gradient" => {
                config.simulation.get_or_insert_with(Default::default).gradient =
                    Some(parse_value(key, value)?);
            }
            "simulation.dielectric" => {
                config.simulation.get_or_insert_with(Default::default).dielectric =
                    Some(parse_value(key, value)?);
            }
            "simulation.backend" => {
                config.simulation.get_or_insert_with(Default::default).backend =
                    Some(parse_value(key, value)?);
            }
            "simulation.infer-bonds" => {
                config.simulation.get_or_insert_with(Default::default).infer_bonds =
                    Some(parse_value(key, value)?);
            }
            "boundary.type" => {
                config.boundary.get_or_insert_with(Default::default).shape =
                    Some(parse_value(key, value)?);
            }
            "boundary.spring" => {
                config.boundary.get_or_insert_with(Default::default).spring =
                    Some(parse_value(key, value)?);
            }
            "boundary.extent" => {
                config.boundary.get_or_insert_with(Default::default).extent =
                    Some(parse_value(key, value)?);
            }
            "boundary.origin" => {
                config.boundary.get_or_insert_with(Default::default).origin =
                    Some(parse_origin(key, value)?);
            }
            "output.energy" => {
                config.output.get_or_insert_with(Default::default).energy =
                    Some(PathBuf::from(value));
            }
            "output.geometry" => {
                config.output.get_or_insert_with(Default::default).geometry =
                    Some(PathBuf::from(value));
            }
            "forcefield.path" => {
                config.forcefield.get_or_insert_with(Default::default).path =
                    Some(PathBuf::from(value));
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdsim::core::models::boundary::BoundaryShape;
    use mdsim::engine::config::BackendKind;
    use std::fs;
    use tempfile::tempdir;

    fn base_run_args() -> RunArgs {
        RunArgs {
            input: PathBuf::from("ethane.pqr"),
            ..RunArgs::default()
        }
    }

    #[test]
    fn build_config_without_file_uses_defaults() {
        let app = build_config(&base_run_args()).expect("build ok");
        let cfg = app.simulation;
        let defaults = DefaultsConfig::default();

        assert_eq!(app.source, None);
        assert_eq!(cfg.input_path, PathBuf::from("ethane.pqr"));
        assert_eq!(cfg.energy_output, defaults.energy_output);
        assert_eq!(cfg.desired_temperature, defaults.desired_temperature);
        assert_eq!(cfg.time_step, defaults.time_step);
        assert_eq!(cfg.state.boundary.extent, defaults.boundary_extent);
        assert_eq!(cfg.gradient_mode, GradientMode::Analytic);
        assert_eq!(cfg.forcefield_path, None);
    }

    #[test]
    fn build_config_reads_file_and_merges() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("run.toml");
        fs::write(
            &cfg_path,
            r#"
            [simulation]
            desired-temperature = 350.0
            time-step = 0.001
            equilibration-time = 0.2
            gradient = "numerical"
            backend = "scalar"

            [boundary]
            type = "cube"
            spring = 100.0
            extent = 20.0

            [output]
            geometry = "traj.xyz"
            time-digits = 6

            [forcefield]
            path = "custom.ff"
            "#,
        )
        .unwrap();

        let mut args = base_run_args();
        args.config = Some(cfg_path.clone());
        let app = build_config(&args).expect("build ok");
        let cfg = app.simulation;

        assert_eq!(app.source, Some(cfg_path));
        assert_eq!(cfg.desired_temperature, 350.0);
        assert_eq!(cfg.time_step, 0.001);
        assert_eq!(cfg.equilibration_time, 0.2);
        assert_eq!(cfg.gradient_mode, GradientMode::Numerical);
        assert_eq!(cfg.state.backend, BackendKind::Scalar);
        assert_eq!(cfg.state.boundary.shape, BoundaryShape::Cube);
        assert_eq!(cfg.state.boundary.spring, 100.0);
        assert_eq!(cfg.state.boundary.extent, 20.0);
        assert_eq!(cfg.geometry_output, PathBuf::from("traj.xyz"));
        assert_eq!(cfg.output_format.time_digits, 6);
        assert_eq!(cfg.output_format.energy_chars, 10);
        assert_eq!(cfg.forcefield_path, Some(PathBuf::from("custom.ff")));
    }

    #[test]
    fn cli_overrides_file_values() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("run.toml");
        fs::write(
            &cfg_path,
            "[simulation]\ndesired-temperature = 350.0\nrandom-seed = 3\n[forcefield]\npath = \"file.ff\"\n",
        )
        .unwrap();

        let mut args = base_run_args();
        args.config = Some(cfg_path);
        args.temperature = Some(200.0);
        args.seed = Some(99);
        args.forcefield = Some(PathBuf::from("cli.ff"));
        args.numerical_gradient = true;

        let cfg = build_config(&args).expect("build ok").simulation;
        assert_eq!(cfg.desired_temperature, 200.0);
        assert_eq!(cfg.random_seed, 99);
        assert_eq!(cfg.forcefield_path, Some(PathBuf::from("cli.ff")));
        assert_eq!(cfg.gradient_mode, GradientMode::Numerical);
    }

    #[test]
    fn set_values_override() {
        let mut args = base_run_args();
        args.set_values = vec![
            "simulation.total-time=2.0".to_string(),
            "simulation.gradient=numerical".to_string(),
            "boundary.type=cube".to_string(),
            "boundary.origin=1.0, 2.0, 3.0".to_string(),
            "output.energy=out/e.dat".to_string(),
        ];

        let cfg = build_config(&args).expect("build ok").simulation;
        assert_eq!(cfg.total_time, 2.0);
        assert_eq!(cfg.gradient_mode, GradientMode::Numerical);
        assert_eq!(cfg.state.boundary.shape, BoundaryShape::Cube);
        assert_eq!(cfg.state.boundary.origin, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(cfg.energy_output, PathBuf::from("out/e.dat"));
    }

    #[test]
    fn set_values_reject_bad_input() {
        for bad in ["simulation.total-time", "simulation.colour=red", "boundary.type=torus", "boundary.origin=1,2"] {
            let mut args = base_run_args();
            args.set_values = vec![bad.to_string()];
            assert!(
                matches!(build_config(&args), Err(CliError::Config(_))),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn invalid_time_step_is_a_config_error() {
        let mut args = base_run_args();
        args.time_step = Some(0.0);
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));
    }
}
