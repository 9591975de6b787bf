use crate::cli::EnergyArgs;
use crate::error::{CliError, Result};
use mdsim::engine::config::{GradientMode, StateConfig};
use mdsim::engine::progress::ProgressReporter;
use mdsim::workflows::single_point::{self, SinglePointConfig, SinglePointResult};
use std::fmt::Write;
use tracing::info;

pub fn run(args: EnergyArgs) -> Result<()> {
    let config = single_point_config(&args)?;
    info!("Evaluating single point of {:?}", config.input_path);
    let result = single_point::run(&config, &ProgressReporter::new());
    print!("{}", format_report(&result));
    Ok(())
}

fn single_point_config(args: &EnergyArgs) -> Result<SinglePointConfig> {
    let mut state = StateConfig::default();
    if let Some(dielectric) = args.dielectric {
        if dielectric <= 0.0 {
            return Err(CliError::Config(format!(
                "Dielectric must be positive, got {}",
                dielectric
            )));
        }
        state.dielectric = dielectric;
    }
    Ok(SinglePointConfig {
        input_path: args.input.clone(),
        forcefield_path: args.forcefield.clone(),
        gradient_mode: if args.numerical_gradient {
            GradientMode::Numerical
        } else {
            GradientMode::Analytic
        },
        state,
    })
}

fn format_report(result: &SinglePointResult) -> String {
    let c = &result.counts;
    let e = &result.energies;
    let mut out = String::new();
    let _ = writeln!(out, "Topology");
    let _ = writeln!(out, "  atoms        {:>8}", c.atoms);
    let _ = writeln!(out, "  bonds        {:>8}", c.bonds);
    let _ = writeln!(out, "  angles       {:>8}", c.angles);
    let _ = writeln!(out, "  torsions     {:>8}", c.torsions);
    let _ = writeln!(out, "  impropers    {:>8}", c.impropers);
    let _ = writeln!(out, "  exclusions   {:>8}", c.exclusions);
    let _ = writeln!(out, "Energy [kcal/mol]");
    for (label, value) in [
        ("bond", e.bond),
        ("angle", e.angle),
        ("torsion", e.torsion),
        ("improper", e.improper),
        ("vdw", e.vdw),
        ("electrostatic", e.electrostatic),
        ("boundary", e.boundary),
        ("bonded", e.bonded()),
        ("non-bonded", e.non_bonded()),
        ("potential", e.potential()),
    ] {
        let _ = writeln!(out, "  {:<13} {:>16.6}", label, value);
    }
    let _ = writeln!(out, "Gradient [kcal/(mol*A)]");
    let _ = writeln!(out, "  rms           {:>16.6}", result.rms_gradient);
    if let Some((atom, norm)) = result.max_gradient {
        let _ = writeln!(out, "  max           {:>16.6}  (atom {})", norm, atom + 1);
    }
    out
}
