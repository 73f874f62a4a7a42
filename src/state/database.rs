use crate::simulation::random::RandomSource;
use crate::state::request::{RequestArena, RequestEntity, RequestId, RequestStatus};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DwellPolicy {
    /// ticks a request waits before completing while the database is healthy
    pub normal: u32,
    /// ticks a request waits while the database is over capacity
    pub overloaded: u32,
    /// chance [0.0, 1.0] that an overloaded completion fails instead
    pub overload_fail_chance: f64,
}

impl Default for DwellPolicy {
    fn default() -> Self {
        Self {
            normal: 25,
            overloaded: 70,
            overload_fail_chance: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DatabaseOutcome {
    pub successes: usize,
    pub failures: usize,
    pub overloaded: bool,
}

/// Requests currently held by the database, oldest first.
pub struct DatabaseQueue {
    queue: Vec<RequestId>,
    capacity: usize,
    policy: DwellPolicy,
}

impl DatabaseQueue {
    pub fn new(capacity: usize, policy: DwellPolicy) -> Self {
        Self {
            queue: Vec::new(),
            capacity,
            policy,
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    pub fn ids(&self) -> &[RequestId] {
        &self.queue
    }

    pub fn is_overloaded(&self) -> bool {
        self.queue.len() > self.capacity
    }

    pub fn enqueue(&mut self, request: &mut RequestEntity) {
        request.status = RequestStatus::InDatabase;
        request.timer = 0;
        self.queue.push(request.id());
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Advances every queued request by one tick. Requests past their dwell
    /// limit leave both the queue and `requests`.
    pub fn process(
        &mut self,
        requests: &mut RequestArena,
        rng: &mut dyn RandomSource,
    ) -> DatabaseOutcome {
        let overloaded = self.is_overloaded();
        let limit = if overloaded {
            self.policy.overloaded
        } else {
            self.policy.normal
        };

        let mut outcome = DatabaseOutcome {
            overloaded,
            ..DatabaseOutcome::default()
        };
        let mut finished = Vec::new();

        for id in &self.queue {
            let Some(request) = requests.get_mut(*id) else {
                finished.push(*id);
                continue;
            };
            request.timer += 1;
            if request.timer <= limit {
                continue;
            }
            if overloaded && rng.chance(self.policy.overload_fail_chance) {
                request.status = RequestStatus::Failed;
                outcome.failures += 1;
            } else {
                request.status = RequestStatus::Done;
                outcome.successes += 1;
            }
            finished.push(*id);
        }

        if !finished.is_empty() {
            self.queue.retain(|id| !finished.contains(id));
            finished.iter().for_each(|id| {
                requests.remove(*id);
            });
        }
        outcome
    }
}
