use crate::cli::RunArgs;
use crate::config::builder::build_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use mdsim::engine::progress::ProgressReporter;
use mdsim::workflows;
use tracing::info;

pub fn run(args: RunArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app_config = build_config(&args)?;
    if let Some(source) = &app_config.source {
        info!("Configuration read from {:?}", source);
    }
    let config = app_config.simulation;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Simulating {} for {} ps at {} K...",
        config.input_path.display(),
        config.total_time,
        config.desired_temperature
    );
    let summary = workflows::simulate::run(&config, reporter)?;

    println!(
        "✓ {} steps ({:.4} ps), final T = {:.2} K, E_total = {:.6} kcal/mol",
        summary.steps,
        summary.simulated_time,
        summary.temperature,
        summary.energies.total()
    );
    println!("  Energies written to: {}", config.energy_output.display());
    println!("  Trajectory written to: {}", config.geometry_output.display());
    Ok(())
}
