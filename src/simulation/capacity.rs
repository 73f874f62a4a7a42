use crate::state::node_health::NodeHealth;
use crate::state::request::RequestArena;
use crate::topology::topology::Topology;
use tracing::warn;

/// Crashes every alive node whose load reached its limit. Returns the
/// indices that crashed this tick.
pub fn apply_crash_policy(
    topology: &dyn Topology,
    requests: &RequestArena,
    health: &mut NodeHealth,
) -> Vec<usize> {
    let crashed = topology
        .nodes()
        .iter()
        .enumerate()
        .filter(|(i, _)| health.is_alive(*i))
        .filter_map(|(i, node)| node.limit().map(|limit| (i, node, limit)))
        .filter_map(|(i, node, limit)| {
            let load = topology.node_load(i, requests);
            if load >= limit {
                warn!(node = node.name(), load, limit, "node crashed under load");
                Some(i)
            } else {
                None
            }
        })
        .collect::<Vec<usize>>();
    crashed.iter().for_each(|i| health.mark_dead(*i));
    crashed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::vec2::Vec2;
    use crate::state::request::{RequestEntity, RequestStatus};
    use crate::topology::micro::MicroserviceTopology;
    use crate::topology::monolith::MonolithTopology;
    use crate::topology::topology::TopologyKind;

    fn load(arena: &mut RequestArena, kind: TopologyKind, count: usize, status: RequestStatus, target: usize) {
        for _ in 0..count {
            let id = arena.insert(|id| RequestEntity::new(id, kind, Vec2::new(500.0, 400.0)));
            let r = arena.get_mut(id).unwrap();
            r.status = status;
            r.target = target;
        }
    }

    #[test]
    fn test_monolith_crashes_at_limit() {
        let topology = MonolithTopology::new(40);
        let mut health = NodeHealth::new(1);
        let mut arena = RequestArena::new();

        load(&mut arena, TopologyKind::Monolith, 20, RequestStatus::ToDatabase, 0);
        load(&mut arena, TopologyKind::Monolith, 19, RequestStatus::InDatabase, 0);
        assert!(apply_crash_policy(&topology, &arena, &mut health).is_empty());
        assert!(health.is_alive(0));

        load(&mut arena, TopologyKind::Monolith, 1, RequestStatus::InDatabase, 0);
        assert_eq!(vec![0], apply_crash_policy(&topology, &arena, &mut health));
        assert!(!health.is_alive(0));

        // already dead nodes are not reported again
        assert!(apply_crash_policy(&topology, &arena, &mut health).is_empty());
    }

    #[test]
    fn test_order_services_crash_independently() {
        let topology = MicroserviceTopology::new(25);
        let mut health = NodeHealth::new(3);
        let mut arena = RequestArena::new();

        load(&mut arena, TopologyKind::Micro, 25, RequestStatus::ToDatabase, 2);
        load(&mut arena, TopologyKind::Micro, 24, RequestStatus::ToDatabase, 1);
        load(&mut arena, TopologyKind::Micro, 50, RequestStatus::InDatabase, 1);
        load(&mut arena, TopologyKind::Micro, 80, RequestStatus::ToAuth, 0);

        assert_eq!(vec![2], apply_crash_policy(&topology, &arena, &mut health));
        assert_eq!(&[true, true, false], health.flags());
    }
}
