use crate::geometry::rect::Rect;
use crate::geometry::vec2::Vec2;
use crate::simulation::config::SimConfig;
use crate::simulation::random::RandomSource;
use crate::state::node_health::NodeHealth;
use crate::state::request::{RequestArena, RequestEntity};
use crate::topology::micro::MicroserviceTopology;
use crate::topology::monolith::MonolithTopology;
use std::fmt;

pub const WORLD_WIDTH: f64 = 1200.0;
pub const WORLD_HEIGHT: f64 = 850.0;

pub const SPAWN_X: f64 = 30.0;
pub const SPAWN_LANES: (i64, i64) = (200, 600);

pub const DATABASE_RECT: Rect = Rect::new(1000.0, 350.0, 80.0, 120.0);
pub const DATABASE_SPEED: f64 = 12.0;
pub const FAILED_SPEED: f64 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum TopologyKind {
    Monolith,
    Micro,
}

impl TopologyKind {
    pub fn other(self) -> Self {
        match self {
            TopologyKind::Monolith => TopologyKind::Micro,
            TopologyKind::Micro => TopologyKind::Monolith,
        }
    }

    pub fn build(self, config: &SimConfig) -> Box<dyn Topology> {
        match self {
            TopologyKind::Monolith => Box::new(MonolithTopology::new(config.mono_limit)),
            TopologyKind::Micro => Box::new(MicroserviceTopology::new(config.svc_limit)),
        }
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyKind::Monolith => write!(f, "MONOLITH"),
            TopologyKind::Micro => write!(f, "MICRO"),
        }
    }
}

pub struct ServiceNode {
    name: String,
    rect: Rect,
    /// in-flight requests at which the node crashes
    limit: Option<usize>,
}

impl ServiceNode {
    pub fn new(name: impl Into<String>, rect: Rect, limit: Option<usize>) -> Self {
        Self {
            name: name.into(),
            rect,
            limit,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

/// What the engine must do with a request after it was routed for a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Continue,
    EnterDatabase,
    Fail,
}

pub trait Topology {
    fn kind(&self) -> TopologyKind;

    /// Index 0 is the entry node (monolith or auth).
    fn nodes(&self) -> &[ServiceNode];

    fn node_load(&self, index: usize, requests: &RequestArena) -> usize;

    /// Moves `request` one tick along its path. Never called for requests
    /// that are in the database or terminal.
    fn route(
        &self,
        request: &mut RequestEntity,
        health: &NodeHealth,
        rng: &mut dyn RandomSource,
    ) -> Route;

    fn node_count(&self) -> usize {
        self.nodes().len()
    }
}

/// The last leg, shared by both topologies.
pub fn travel_to_database(request: &mut RequestEntity) -> Route {
    request
        .position
        .move_towards(DATABASE_RECT.center(), DATABASE_SPEED);
    if DATABASE_RECT.contains(request.position) {
        Route::EnterDatabase
    } else {
        Route::Continue
    }
}

pub fn spawn_point(rng: &mut dyn RandomSource) -> Vec2 {
    let (lo, hi) = SPAWN_LANES;
    Vec2::new(SPAWN_X, rng.lane(lo, hi) as f64)
}
