use crate::simulation::config::SimConfig;
use crate::simulation::engine::{Simulation, TickReport};
use crate::simulation::random::RandomSource;
use crate::topology::topology::TopologyKind;
use tracing::info;

const FLOW_STEPS: u8 = 10;

/// Spawn probability, held in tenths so repeated steps stay exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowRate(u8);

impl FlowRate {
    pub fn from_probability(p: f64) -> Self {
        let tenths = (p.clamp(0.0, 1.0) * FLOW_STEPS as f64).round() as u8;
        Self(tenths)
    }

    pub fn tenths(self) -> u8 {
        self.0
    }

    pub fn probability(self) -> f64 {
        self.0 as f64 / FLOW_STEPS as f64
    }

    pub fn percent(self) -> u8 {
        self.tenths() * 10
    }

    pub fn adjust(self, steps: i8) -> Self {
        let tenths = (self.0 as i16 + steps as i16).clamp(0, FLOW_STEPS as i16);
        Self(tenths as u8)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    SwapTopology,
    /// in steps of 0.1
    AdjustFlow(i8),
    Reboot,
    ToggleNode(usize),
}

/// Owns the running simulation and applies commands between ticks.
pub struct Controller {
    simulation: Simulation,
    flow: FlowRate,
    config: SimConfig,
    rng: Box<dyn RandomSource>,
}

impl Controller {
    pub fn new(
        kind: TopologyKind,
        flow: FlowRate,
        config: SimConfig,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            simulation: Simulation::new(kind, &config),
            flow,
            config,
            rng,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn flow(&self) -> FlowRate {
        self.flow
    }

    pub fn tick(&mut self) -> TickReport {
        self.simulation
            .step(self.flow.probability(), self.rng.as_mut())
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SwapTopology => {
                let next = self.simulation.kind().other();
                self.simulation = Simulation::new(next, &self.config);
                info!(topology = %next, "topology swapped");
            }
            Command::AdjustFlow(steps) => {
                self.flow = self.flow.adjust(steps);
                info!(flow = self.flow.probability(), "flow adjusted");
            }
            Command::Reboot => self.simulation.reboot(),
            Command::ToggleNode(index) => {
                self.simulation.toggle_node(index);
            }
        }
    }
}
