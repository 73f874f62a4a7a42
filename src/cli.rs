use crate::error::ConfigError;
use crate::simulation::config::{FailureAccounting, SimConfig};
use crate::simulation::control::FlowRate;
use crate::state::database::DwellPolicy;
use crate::topology::topology::TopologyKind;
use clap::Parser;
use std::path::PathBuf;

/// Animated comparison of a monolith and a microservice deployment under
/// the same synthetic traffic.
#[derive(Debug, Parser)]
#[command(name = "archsim", version)]
pub struct Cli {
    /// Architecture to start with
    #[arg(long, value_enum, default_value_t = TopologyKind::Monolith)]
    pub topology: TopologyKind,

    /// Spawn probability per tick, rounded to tenths
    #[arg(long, default_value_t = 0.1)]
    pub flow: f64,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Ticks per second in the terminal UI
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// In-flight requests that crash the monolith
    #[arg(long, default_value_t = 40)]
    pub mono_limit: usize,

    /// In-flight requests that crash one order service
    #[arg(long, default_value_t = 25)]
    pub svc_limit: usize,

    /// Queue length above which the database is overloaded
    #[arg(long, default_value_t = 35)]
    pub db_capacity: usize,

    /// Samples kept in each rate history
    #[arg(long, default_value_t = 200)]
    pub history_len: usize,

    /// Count each failed request once instead of every tick it is visible
    #[arg(long)]
    pub count_failures_once: bool,

    /// Run without the terminal UI
    #[arg(long)]
    pub headless: bool,

    /// Ticks to run in headless mode
    #[arg(long, default_value_t = 1000)]
    pub ticks: u64,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,
}

impl Cli {
    pub fn sim_config(&self) -> Result<SimConfig, ConfigError> {
        let config = SimConfig {
            mono_limit: self.mono_limit,
            svc_limit: self.svc_limit,
            db_capacity: self.db_capacity,
            history_len: self.history_len,
            dwell: DwellPolicy::default(),
            accounting: if self.count_failures_once {
                FailureAccounting::OnTransition
            } else {
                FailureAccounting::PerTick
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn flow_rate(&self) -> Result<FlowRate, ConfigError> {
        if !(0.0..=1.0).contains(&self.flow) {
            return Err(ConfigError::Probability {
                name: "flow",
                value: self.flow,
            });
        }
        Ok(FlowRate::from_probability(self.flow))
    }

    pub fn frame_rate(&self) -> Result<u32, ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::ZeroLimit("fps"));
        }
        Ok(self.fps)
    }
}
