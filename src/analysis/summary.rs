use crate::simulation::engine::Simulation;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeRisk {
    Low,
    Elevated,
    Critical,
    Down,
}

pub struct NodeSummary {
    name: String,
    alive: bool,
    load: usize,
    limit: Option<usize>,
}

impl NodeSummary {
    pub fn new(name: String, alive: bool, load: usize, limit: Option<usize>) -> Self {
        Self {
            name,
            alive,
            load,
            limit,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn load(&self) -> usize {
        self.load
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// load / limit, 0.0 for nodes without a limit
    pub fn utilization(&self) -> f64 {
        match self.limit {
            Some(limit) if limit > 0 => self.load as f64 / limit as f64,
            _ => 0.0,
        }
    }

    pub fn risk(&self) -> NodeRisk {
        if !self.alive {
            return NodeRisk::Down;
        }
        match self.utilization() {
            u if u < 0.6 => NodeRisk::Low,
            u if u < 0.85 => NodeRisk::Elevated,
            _ => NodeRisk::Critical,
        }
    }
}

pub struct DatabaseSummary {
    pub queued: usize,
    pub capacity: usize,
    pub overloaded: bool,
}

impl DatabaseSummary {
    pub fn occupancy(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.queued as f64 / self.capacity as f64
        }
    }
}

pub fn summarize_nodes(sim: &Simulation) -> Vec<NodeSummary> {
    sim.topology()
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, node)| {
            NodeSummary::new(
                node.name().to_string(),
                sim.health().is_alive(i),
                sim.node_load(i),
                node.limit(),
            )
        })
        .collect()
}

pub fn summarize_database(sim: &Simulation) -> DatabaseSummary {
    let db = sim.database();
    DatabaseSummary {
        queued: db.len(),
        capacity: db.capacity(),
        overloaded: db.is_overloaded(),
    }
}
