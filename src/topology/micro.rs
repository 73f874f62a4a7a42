use crate::geometry::rect::Rect;
use crate::simulation::random::RandomSource;
use crate::state::node_health::NodeHealth;
use crate::state::request::{RequestArena, RequestEntity, RequestStatus};
use crate::topology::topology::{Route, ServiceNode, Topology, TopologyKind, travel_to_database};

const AUTH_RECT: Rect = Rect::new(320.0, 350.0, 100.0, 100.0);
const ORDER_RECTS: [Rect; 2] = [
    Rect::new(650.0, 250.0, 100.0, 100.0),
    Rect::new(650.0, 450.0, 100.0, 100.0),
];
const ORDER_NODES: [usize; 2] = [1, 2];

const AUTH_SPEED: f64 = 8.0;
const ORDER_SPEED: f64 = 9.0;

/// Auth gateway in front of two interchangeable order services. Only the
/// order services have a worker limit.
pub struct MicroserviceTopology {
    nodes: Vec<ServiceNode>,
}

impl MicroserviceTopology {
    pub fn new(limit: usize) -> Self {
        Self {
            nodes: vec![
                ServiceNode::new("auth", AUTH_RECT, None),
                ServiceNode::new("order-1", ORDER_RECTS[0], Some(limit)),
                ServiceNode::new("order-2", ORDER_RECTS[1], Some(limit)),
            ],
        }
    }

    fn authenticate(
        &self,
        request: &mut RequestEntity,
        health: &NodeHealth,
        rng: &mut dyn RandomSource,
    ) -> Route {
        if !health.is_alive(0) {
            return Route::Fail;
        }
        let targets = health.alive_among(&ORDER_NODES);
        if targets.is_empty() {
            return Route::Fail;
        }
        request.target = targets[rng.pick(targets.len())];
        request.status = RequestStatus::ToOrder;
        Route::Continue
    }
}

impl Topology for MicroserviceTopology {
    fn kind(&self) -> TopologyKind {
        TopologyKind::Micro
    }

    fn nodes(&self) -> &[ServiceNode] {
        &self.nodes
    }

    fn node_load(&self, index: usize, requests: &RequestArena) -> usize {
        match index {
            0 => requests.count_where(|r| r.status == RequestStatus::ToAuth),
            i if ORDER_NODES.contains(&i) => requests
                .count_where(|r| r.status == RequestStatus::ToDatabase && r.target == i),
            _ => 0,
        }
    }

    fn route(
        &self,
        request: &mut RequestEntity,
        health: &NodeHealth,
        rng: &mut dyn RandomSource,
    ) -> Route {
        match request.status {
            RequestStatus::ToAuth => {
                request.position.move_towards(AUTH_RECT.center(), AUTH_SPEED);
                if AUTH_RECT.contains(request.position) {
                    self.authenticate(request, health, rng)
                } else {
                    Route::Continue
                }
            }
            RequestStatus::ToOrder => {
                // a crash after assignment does not fail the request
                let Some(node) = self.nodes.get(request.target) else {
                    return Route::Fail;
                };
                let rect = node.rect();
                request.position.move_towards(rect.center(), ORDER_SPEED);
                if rect.contains(request.position) {
                    request.status = RequestStatus::ToDatabase;
                }
                Route::Continue
            }
            RequestStatus::ToDatabase => travel_to_database(request),
            _ => Route::Continue,
        }
    }
}
