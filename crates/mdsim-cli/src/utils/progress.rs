use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use mdsim::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;
/// Bar positions are whole femtoseconds of simulated time.
const FS_PER_PS: f64 = 1000.0;

fn to_femtoseconds(ps: f64) -> u64 {
    (ps * FS_PER_PS).round().max(0.0) as u64
}

#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.disable_steady_tick();
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    pb_guard.reset();
                    pb_guard.set_length(0);
                    pb_guard.set_style(Self::spinner_style());
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message(name.to_string());
                }
                Progress::PhaseFinish => {
                    pb_guard.disable_steady_tick();
                    pb_guard.finish_with_message("✓ Done");
                }
                Progress::TaskStart { total_time } => {
                    pb_guard.disable_steady_tick();
                    pb_guard.reset();
                    pb_guard.set_length(to_femtoseconds(total_time));
                    pb_guard.set_position(0);
                    pb_guard.set_style(Self::bar_style());
                }
                Progress::TaskAdvance { time } => {
                    let length = pb_guard.length().unwrap_or(0);
                    pb_guard.set_position(to_femtoseconds(time).min(length));
                }
                Progress::TaskFinish => {
                    if pb_guard.position() < pb_guard.length().unwrap_or(0) {
                        pb_guard.set_position(pb_guard.length().unwrap_or(0));
                    }
                    pb_guard.finish();
                }
                Progress::Status {
                    temperature,
                    total_energy,
                    ..
                } => {
                    pb_guard.set_message(format!(
                        "T {:>7.1} K  E {:>11.4}",
                        temperature, total_energy
                    ));
                }
                Progress::Message(msg) => {
                    if !pb_guard.is_finished() {
                        pb_guard.println(format!("  {}", msg));
                    } else {
                        pb_guard.set_message(msg);
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Failed to create spinner style template")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<28} [{bar:40.cyan/blue}] {pos}/{len} fs ({eta})")
            .expect("Failed to create bar style template")
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::new();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
    }

    #[test]
    fn callback_tracks_simulated_time() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Dynamics" });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "Dynamics");
            assert!(!pb.is_finished());
        }

        callback(Progress::TaskStart { total_time: 0.5 });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.length(), Some(500));
            assert_eq!(pb.position(), 0);
        }

        callback(Progress::TaskAdvance { time: 0.012 });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.position(), 12);
        }

        callback(Progress::Status {
            time: 0.012,
            total_time: 0.5,
            temperature: 301.0,
            total_energy: -12.5,
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert!(pb.message().contains("301.0 K"));
        }

        callback(Progress::TaskFinish);
        {
            let pb = handler.pb.lock().unwrap();
            assert!(pb.is_finished());
            assert_eq!(pb.position(), 500);
        }

        callback(Progress::PhaseFinish);
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "✓ Done");
        }
    }

    #[test]
    fn advance_past_end_is_clamped() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();
        callback(Progress::TaskStart { total_time: 0.001 });
        callback(Progress::TaskAdvance { time: 0.0015 });
        assert_eq!(handler.pb.lock().unwrap().position(), 1);
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart {
                name: "Preparation",
            });
            callback(Progress::TaskAdvance { time: 0.001 });
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "✓ Done");
    }
}
