use crate::error::ConfigError;
use crate::state::database::DwellPolicy;

/// How fleeing failed requests feed the failure history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureAccounting {
    /// Every tick a failed request is still on screen counts once. Requests
    /// failed by the database leave at once and are not counted.
    PerTick,
    /// Each failed request counts once, on the tick it fails.
    OnTransition,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    pub mono_limit: usize,
    pub svc_limit: usize,
    pub db_capacity: usize,
    pub history_len: usize,
    pub dwell: DwellPolicy,
    pub accounting: FailureAccounting,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mono_limit: 40,
            svc_limit: 25,
            db_capacity: 35,
            history_len: 200,
            dwell: DwellPolicy::default(),
            accounting: FailureAccounting::PerTick,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mono_limit == 0 {
            return Err(ConfigError::ZeroLimit("mono-limit"));
        }
        if self.svc_limit == 0 {
            return Err(ConfigError::ZeroLimit("svc-limit"));
        }
        if self.history_len == 0 {
            return Err(ConfigError::ZeroLimit("history-len"));
        }
        let chance = self.dwell.overload_fail_chance;
        if !(0.0..=1.0).contains(&chance) {
            return Err(ConfigError::Probability {
                name: "overload-fail-chance",
                value: chance,
            });
        }
        Ok(())
    }
}
