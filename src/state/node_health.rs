/// Alive flags, one per service node of the current topology.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeHealth {
    alive: Vec<bool>,
}

impl NodeHealth {
    /// `count` is clamped to at least one node.
    pub fn new(count: usize) -> Self {
        Self {
            alive: vec![true; count.max(1)],
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.alive.len()
    }

    pub fn is_alive(&self, index: usize) -> bool {
        self.alive.get(index).copied().unwrap_or(false)
    }

    #[cfg(test)]
    pub fn flags(&self) -> &[bool] {
        &self.alive
    }

    pub fn mark_dead(&mut self, index: usize) {
        if let Some(flag) = self.alive.get_mut(index) {
            *flag = false;
        }
    }

    /// Flips one flag. Returns `false` when `index` does not exist.
    pub fn toggle(&mut self, index: usize) -> bool {
        match self.alive.get_mut(index) {
            Some(flag) => {
                *flag = !*flag;
                true
            }
            None => false,
        }
    }

    pub fn revive_all(&mut self) {
        self.alive.iter_mut().for_each(|flag| *flag = true);
    }

    pub fn alive_among(&self, indices: &[usize]) -> Vec<usize> {
        indices
            .iter()
            .copied()
            .filter(|&i| self.is_alive(i))
            .collect()
    }
}
