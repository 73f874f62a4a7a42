use crate::geometry::vec2::Vec2;
use crate::topology::topology::TopologyKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub usize);

impl RequestId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestStatus {
    ToAuth,
    ToOrder,
    ToDatabase,
    InDatabase,
    Done,
    Failed,
}

#[derive(Clone, Debug)]
pub struct RequestEntity {
    id: RequestId,
    pub position: Vec2,
    mode: TopologyKind,
    pub status: RequestStatus,
    /// 0 until routed, then 1 or 2
    pub target: usize,
    pub timer: u32,
}

impl RequestEntity {
    pub fn new(id: RequestId, mode: TopologyKind, position: Vec2) -> Self {
        Self {
            id,
            position,
            mode,
            status: RequestStatus::ToAuth,
            target: 0,
            timer: 0,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn mode(&self) -> TopologyKind {
        self.mode
    }

    pub fn is_failed(&self) -> bool {
        self.status == RequestStatus::Failed
    }
}

/// Live requests. Slots are reused after removal, so a `RequestId` is only
/// meaningful while its request is alive.
#[derive(Default)]
pub struct RequestArena {
    slots: Vec<Option<RequestEntity>>,
    free: Vec<usize>,
    live: usize,
}

impl RequestArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, build: impl FnOnce(RequestId) -> RequestEntity) -> RequestId {
        let index = self.free.pop().unwrap_or_else(|| {
            self.slots.push(None);
            self.slots.len() - 1
        });
        let id = RequestId(index);
        self.slots[index] = Some(build(id));
        self.live += 1;
        id
    }

    #[cfg(test)]
    pub fn get(&self, id: RequestId) -> Option<&RequestEntity> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: RequestId) -> Option<&mut RequestEntity> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn remove(&mut self, id: RequestId) -> Option<RequestEntity> {
        let removed = self.slots.get_mut(id.index()).and_then(Option::take);
        if removed.is_some() {
            self.free.push(id.index());
            self.live -= 1;
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestEntity> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RequestEntity> {
        self.slots.iter_mut().flatten()
    }

    pub fn count_where(&self, pred: impl Fn(&RequestEntity) -> bool) -> usize {
        self.iter().filter(|r| pred(r)).count()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}
