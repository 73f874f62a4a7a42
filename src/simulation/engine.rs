use crate::simulation::capacity::apply_crash_policy;
use crate::simulation::config::{FailureAccounting, SimConfig};
use crate::simulation::random::RandomSource;
use crate::state::database::DatabaseQueue;
use crate::state::metrics::MetricsAggregator;
use crate::state::node_health::NodeHealth;
use crate::state::request::{RequestArena, RequestEntity, RequestId, RequestStatus};
use crate::topology::topology::{
    FAILED_SPEED, Route, Topology, TopologyKind, WORLD_WIDTH, spawn_point,
};
use tracing::{debug, info, warn};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub spawned: Option<RequestId>,
    pub crashed: Vec<usize>,
    pub successes: usize,
    pub failures: usize,
    pub db_overloaded: bool,
}

/// Everything one topology run owns. Swapping topology builds a new one.
pub struct Simulation {
    topology: Box<dyn Topology>,
    requests: RequestArena,
    health: NodeHealth,
    database: DatabaseQueue,
    metrics: MetricsAggregator,
    accounting: FailureAccounting,
    tick: u64,
}

impl Simulation {
    pub fn new(kind: TopologyKind, config: &SimConfig) -> Self {
        let topology = kind.build(config);
        let health = NodeHealth::new(topology.node_count());
        Self {
            topology,
            requests: RequestArena::new(),
            health,
            database: DatabaseQueue::new(config.db_capacity, config.dwell),
            metrics: MetricsAggregator::new(config.history_len),
            accounting: config.accounting,
            tick: 0,
        }
    }

    pub fn kind(&self) -> TopologyKind {
        self.topology.kind()
    }

    pub fn topology(&self) -> &dyn Topology {
        self.topology.as_ref()
    }

    pub fn requests(&self) -> &RequestArena {
        &self.requests
    }

    pub fn health(&self) -> &NodeHealth {
        &self.health
    }

    pub fn database(&self) -> &DatabaseQueue {
        &self.database
    }

    pub fn metrics(&self) -> &MetricsAggregator {
        &self.metrics
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn node_load(&self, index: usize) -> usize {
        self.topology.node_load(index, &self.requests)
    }

    pub fn step(&mut self, spawn_probability: f64, rng: &mut dyn RandomSource) -> TickReport {
        let spawned = self.spawn(spawn_probability, rng);

        let crashed = apply_crash_policy(self.topology.as_ref(), &self.requests, &mut self.health);

        let was_overloaded = self.database.is_overloaded();
        let db = self.database.process(&mut self.requests, rng);
        if db.overloaded && !was_overloaded {
            warn!(queued = self.database.len(), capacity = self.database.capacity(), "database overloaded");
        }

        let mut failures = self.advance_requests(rng);
        if self.accounting == FailureAccounting::OnTransition {
            failures += db.failures;
        }

        self.metrics.record(db.successes, failures);
        self.tick += 1;

        let report = TickReport {
            tick: self.tick,
            spawned,
            crashed,
            successes: db.successes,
            failures,
            db_overloaded: db.overloaded,
        };
        debug!(?report, live = self.requests.len(), "tick");
        report
    }

    fn spawn(&mut self, probability: f64, rng: &mut dyn RandomSource) -> Option<RequestId> {
        if !rng.chance(probability) {
            return None;
        }
        let mode = self.topology.kind();
        let position = spawn_point(rng);
        Some(
            self.requests
                .insert(|id| RequestEntity::new(id, mode, position)),
        )
    }

    /// Routes every request outside the database and returns this tick's
    /// failure count.
    fn advance_requests(&mut self, rng: &mut dyn RandomSource) -> usize {
        let mut failures = 0;
        let mut gone = Vec::new();

        for request in self.requests.iter_mut() {
            match request.status {
                RequestStatus::InDatabase | RequestStatus::Done => continue,
                RequestStatus::Failed => {
                    if self.accounting == FailureAccounting::PerTick {
                        failures += 1;
                    }
                    request.position.x += FAILED_SPEED;
                    if request.position.x > WORLD_WIDTH {
                        gone.push(request.id());
                    }
                    continue;
                }
                _ => {}
            }

            debug_assert_eq!(self.topology.kind(), request.mode());
            match self.topology.route(request, &self.health, rng) {
                Route::Continue => {}
                Route::EnterDatabase => self.database.enqueue(request),
                Route::Fail => {
                    request.status = RequestStatus::Failed;
                    if self.accounting == FailureAccounting::OnTransition {
                        failures += 1;
                    }
                }
            }
        }

        gone.into_iter().for_each(|id| {
            self.requests.remove(id);
        });
        failures
    }

    /// Revives every node and drops all traffic. History is kept.
    pub fn reboot(&mut self) {
        self.health.revive_all();
        self.requests.clear();
        self.database.clear();
        info!(topology = %self.kind(), "rebooted");
    }

    pub fn toggle_node(&mut self, index: usize) -> bool {
        let toggled = self.health.toggle(index);
        if toggled {
            info!(
                node = self.topology.nodes()[index].name(),
                alive = self.health.is_alive(index),
                "node toggled"
            );
        }
        toggled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::vec2::Vec2;
    use crate::simulation::random::{RngSource, ScriptedRandom};
    use crate::topology::topology::DATABASE_RECT;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn place(sim: &mut Simulation, position: Vec2, status: RequestStatus) -> RequestId {
        let mode = sim.kind();
        let id = sim
            .requests
            .insert(|id| RequestEntity::new(id, mode, position));
        let r = sim.requests.get_mut(id).unwrap();
        if status == RequestStatus::InDatabase {
            sim.database.enqueue(r);
        } else {
            r.status = status;
        }
        id
    }

    fn assert_invariants(sim: &Simulation) {
        let expected_nodes = match sim.kind() {
            TopologyKind::Monolith => 1,
            TopologyKind::Micro => 3,
        };
        assert_eq!(expected_nodes, sim.health().len());
        let in_db = sim
            .requests()
            .count_where(|r| r.status == RequestStatus::InDatabase);
        assert_eq!(in_db, sim.database().len());
        assert!(sim
            .database()
            .ids()
            .iter()
            .all(|id| sim.requests().get(*id).is_some()));
        let metrics = sim.metrics();
        assert_eq!(200, metrics.successes().len());
        assert_eq!(200, metrics.failures().len());
        assert!(metrics.successes().iter().all(|v| *v <= 120));
        assert!(metrics.failures().iter().all(|v| *v <= 120));
    }

    #[test]
    fn test_spawn_follows_probability() {
        let mut sim = Simulation::new(TopologyKind::Monolith, &SimConfig::default());
        let mut rng = ScriptedRandom::new().with_lanes([321]);

        let report = sim.step(0.0, &mut rng);
        assert!(report.spawned.is_none());
        assert!(sim.requests().is_empty());

        let report = sim.step(1.0, &mut rng);
        let id = report.spawned.unwrap();
        let r = sim.requests().get(id).unwrap();
        assert_eq!(TopologyKind::Monolith, r.mode());
        assert_eq!(RequestStatus::ToAuth, r.status);
        // spawned then routed in the same tick
        assert_relative_eq!(
            8.0,
            r.position.distance_to(Vec2::new(30.0, 321.0)),
            epsilon = 1e-9
        );
        assert_eq!(2, sim.tick());
    }

    #[test]
    fn test_monolith_crash_fails_all_traffic() {
        let mut sim = Simulation::new(TopologyKind::Monolith, &SimConfig::default());
        let mut rng = ScriptedRandom::new();
        for _ in 0..40 {
            place(&mut sim, Vec2::new(460.0, 400.0), RequestStatus::ToDatabase);
        }

        let report = sim.step(0.0, &mut rng);
        assert_eq!(vec![0], report.crashed);
        assert!(!sim.health().is_alive(0));
        assert_eq!(40, sim.requests().count_where(|r| r.is_failed()));

        for _ in 0..30 {
            sim.step(1.0, &mut rng);
            assert_eq!(
                0,
                sim.requests().count_where(|r| matches!(
                    r.status,
                    RequestStatus::ToDatabase | RequestStatus::InDatabase
                ))
            );
            assert_invariants(&sim);
        }
    }

    #[test]
    fn test_monolith_below_limit_stays_up() {
        let mut sim = Simulation::new(TopologyKind::Monolith, &SimConfig::default());
        let mut rng = ScriptedRandom::new();
        for _ in 0..39 {
            place(&mut sim, Vec2::new(460.0, 400.0), RequestStatus::ToDatabase);
        }
        let report = sim.step(0.0, &mut rng);
        assert!(report.crashed.is_empty());
        assert!(sim.health().is_alive(0));
    }

    #[test]
    fn test_database_completion_at_tick_26() {
        let mut sim = Simulation::new(TopologyKind::Monolith, &SimConfig::default());
        let mut rng = ScriptedRandom::new();
        let id = place(&mut sim, DATABASE_RECT.center(), RequestStatus::InDatabase);

        for _ in 0..25 {
            let report = sim.step(0.0, &mut rng);
            assert_eq!(0, report.successes);
        }
        assert_eq!(25, sim.requests().get(id).unwrap().timer);

        let report = sim.step(0.0, &mut rng);
        assert_eq!(1, report.successes);
        assert!(sim.requests().is_empty());
        assert!(sim.database().is_empty());
        assert_eq!((12, 0), sim.metrics().latest());
    }

    #[test]
    fn test_failed_request_flees_and_counts_every_tick() {
        let mut sim = Simulation::new(TopologyKind::Micro, &SimConfig::default());
        let mut rng = ScriptedRandom::new();
        let id = place(&mut sim, Vec2::new(1170.0, 400.0), RequestStatus::Failed);

        sim.step(0.0, &mut rng);
        assert_eq!(1185.0, sim.requests().get(id).unwrap().position.x);
        assert_eq!((0, 8), sim.metrics().latest());

        sim.step(0.0, &mut rng);
        assert_eq!(1200.0, sim.requests().get(id).unwrap().position.x);

        let report = sim.step(0.0, &mut rng);
        assert_eq!(1, report.failures);
        assert!(sim.requests().is_empty());

        let report = sim.step(0.0, &mut rng);
        assert_eq!(0, report.failures);
    }

    #[test]
    fn test_failures_counted_once_on_transition() {
        let config = SimConfig {
            accounting: FailureAccounting::OnTransition,
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(TopologyKind::Monolith, &config);
        let mut rng = ScriptedRandom::new();
        sim.toggle_node(0);
        place(&mut sim, Vec2::new(100.0, 400.0), RequestStatus::ToAuth);

        let report = sim.step(0.0, &mut rng);
        assert_eq!(1, report.failures);
        for _ in 0..5 {
            assert_eq!(0, sim.step(0.0, &mut rng).failures);
        }
        assert_eq!(1, sim.requests().len());
    }

    fn overloaded_database(accounting: FailureAccounting) -> (Simulation, ScriptedRandom) {
        let config = SimConfig {
            db_capacity: 1,
            accounting,
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(TopologyKind::Monolith, &config);
        place(&mut sim, DATABASE_RECT.center(), RequestStatus::InDatabase);
        place(&mut sim, DATABASE_RECT.center(), RequestStatus::InDatabase);
        // first completion fails, second succeeds
        let rng = ScriptedRandom::new().with_chances([true, false]);
        (sim, rng)
    }

    #[test]
    fn test_database_failures_not_counted_per_tick() {
        let (mut sim, mut rng) = overloaded_database(FailureAccounting::PerTick);
        for _ in 0..70 {
            let report = sim.step(0.0, &mut rng);
            assert!(report.db_overloaded);
            assert_eq!(0, report.successes);
        }

        let report = sim.step(0.0, &mut rng);
        assert_eq!(1, report.successes);
        assert_eq!(0, report.failures);
        assert_eq!((12, 0), sim.metrics().latest());
        assert!(sim.requests().is_empty());
        assert!(sim.database().is_empty());
    }

    #[test]
    fn test_database_failures_counted_on_transition() {
        let (mut sim, mut rng) = overloaded_database(FailureAccounting::OnTransition);
        for _ in 0..70 {
            sim.step(0.0, &mut rng);
        }

        let report = sim.step(0.0, &mut rng);
        assert_eq!(1, report.successes);
        assert_eq!(1, report.failures);
        assert_eq!((12, 8), sim.metrics().latest());
        assert!(sim.requests().is_empty());
    }

    #[test]
    fn test_reboot_keeps_history() {
        let mut sim = Simulation::new(TopologyKind::Micro, &SimConfig::default());
        let mut rng = ScriptedRandom::new();
        place(&mut sim, Vec2::new(500.0, 400.0), RequestStatus::Failed);
        place(&mut sim, DATABASE_RECT.center(), RequestStatus::InDatabase);
        sim.toggle_node(0);
        sim.toggle_node(2);
        sim.step(0.0, &mut rng);

        sim.reboot();
        assert!(sim.requests().is_empty());
        assert!(sim.database().is_empty());
        assert_eq!(&[true, true, true], sim.health().flags());
        assert_eq!((0, 8), sim.metrics().latest());
    }

    #[test]
    fn test_toggle_missing_node_is_noop() {
        let mut sim = Simulation::new(TopologyKind::Monolith, &SimConfig::default());
        assert!(!sim.toggle_node(2));
        assert_eq!(&[true], sim.health().flags());
    }

    #[test]
    fn test_invariants_hold_under_random_traffic() {
        for kind in [TopologyKind::Monolith, TopologyKind::Micro] {
            let mut sim = Simulation::new(kind, &SimConfig::default());
            let mut rng = RngSource::new(StdRng::seed_from_u64(11));
            let mut completed = 0;
            for tick in 0..3000 {
                let flow = if tick < 1500 { 0.5 } else { 1.0 };
                completed += sim.step(flow, &mut rng).successes;
                assert_invariants(&sim);
            }
            assert!(completed > 0);
        }
    }
}
