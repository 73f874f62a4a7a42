use crate::geometry::rect::Rect;
use crate::simulation::random::RandomSource;
use crate::state::node_health::NodeHealth;
use crate::state::request::{RequestArena, RequestEntity, RequestStatus};
use crate::topology::topology::{Route, ServiceNode, Topology, TopologyKind, travel_to_database};

const BLOCK_RECT: Rect = Rect::new(450.0, 300.0, 200.0, 220.0);
const ENTRY_SPEED: f64 = 8.0;

/// One service that does everything. Every request in flight to or inside
/// the database holds one of its workers.
pub struct MonolithTopology {
    nodes: Vec<ServiceNode>,
}

impl MonolithTopology {
    pub fn new(limit: usize) -> Self {
        Self {
            nodes: vec![ServiceNode::new("monolith", BLOCK_RECT, Some(limit))],
        }
    }
}

impl Topology for MonolithTopology {
    fn kind(&self) -> TopologyKind {
        TopologyKind::Monolith
    }

    fn nodes(&self) -> &[ServiceNode] {
        &self.nodes
    }

    fn node_load(&self, index: usize, requests: &RequestArena) -> usize {
        if index != 0 {
            return 0;
        }
        requests.count_where(|r| {
            matches!(
                r.status,
                RequestStatus::ToDatabase | RequestStatus::InDatabase
            )
        })
    }

    fn route(
        &self,
        request: &mut RequestEntity,
        health: &NodeHealth,
        _rng: &mut dyn RandomSource,
    ) -> Route {
        match request.status {
            RequestStatus::ToAuth | RequestStatus::ToDatabase if !health.is_alive(0) => Route::Fail,
            RequestStatus::ToAuth => {
                request
                    .position
                    .move_towards(BLOCK_RECT.center(), ENTRY_SPEED);
                if BLOCK_RECT.contains(request.position) {
                    request.status = RequestStatus::ToDatabase;
                }
                Route::Continue
            }
            RequestStatus::ToDatabase => travel_to_database(request),
            _ => Route::Continue,
        }
    }
}
