//! Playback handle pool
//!
//! Hands out the first idle handle found by linear scan and grows by one
//! handle whenever none is idle. The pool never shrinks.
use super::handle::{HandleId, PlaybackHandle, StreamHandle};

#[derive(Debug, Default)]
pub struct HandlePool {
    handles: Vec<PlaybackHandle>,
}

impl HandlePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow an idle handle, creating one if every handle is busy
    pub fn acquire(&mut self) -> HandleId {
        self.acquire_handle().id()
    }

    pub(crate) fn acquire_handle(&mut self) -> &mut PlaybackHandle {
        let index = match self.handles.iter().position(|h| h.is_idle()) {
            Some(index) => index,
            None => {
                self.handles.push(PlaybackHandle::new(HandleId::new(self.handles.len())));
                tracing::debug!("Audio pool grew to {} handle(s)", self.handles.len());
                self.handles.len() - 1
            }
        };

        let handle = &mut self.handles[index];
        handle.begin();
        handle
    }

    /// Clear the handle's clip and return it to the idle set
    pub fn release(&mut self, id: HandleId) {
        if let Some(handle) = self.handles.get_mut(id.index()) {
            handle.reset();
        }
    }

    pub fn get(&self, id: HandleId) -> Option<&PlaybackHandle> {
        self.handles.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: HandleId) -> Option<&mut PlaybackHandle> {
        self.handles.get_mut(id.index())
    }

    /// Look up the handle behind a stream, if the stream is still current
    pub fn resolve(&self, stream: &StreamHandle) -> Option<&PlaybackHandle> {
        self.get(stream.id()).filter(|h| h.matches(stream))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn idle_count(&self) -> usize {
        self.handles.iter().filter(|h| h.is_idle()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaybackHandle> {
        self.handles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_grows_when_nothing_idle() {
        let mut pool = HandlePool::new();
        let a = pool.acquire();
        let b = pool.acquire();
        let c = pool.acquire();

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_released_handle_is_reused() {
        let mut pool = HandlePool::new();
        let _a = pool.acquire();
        let b = pool.acquire();
        let _c = pool.acquire();

        pool.release(b);
        assert_eq!(pool.acquire(), b);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_first_idle_handle_wins() {
        let mut pool = HandlePool::new();
        let a = pool.acquire();
        let b = pool.acquire();
        let c = pool.acquire();

        pool.release(c);
        pool.release(a);
        assert_eq!(pool.acquire(), a);
        assert_eq!(pool.acquire(), c);
        assert_ne!(pool.acquire(), b);
    }

    #[test]
    fn test_pool_size_bounded_by_acquisitions() {
        let mut pool = HandlePool::new();
        let mut acquired = 0;

        for round in 0..5 {
            let before = pool.len();
            let idle = pool.idle_count();
            let ids: Vec<_> = (0..idle + 2).map(|_| pool.acquire()).collect();
            acquired += ids.len();

            assert!(pool.len() > before, "round {round} did not grow");
            assert!(pool.len() <= acquired);

            // Free every other handle for the next round
            for id in ids.iter().step_by(2) {
                pool.release(*id);
            }
        }
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut pool = HandlePool::new();
        let a = pool.acquire();
        pool.release(a);
        pool.release(a);
        assert_eq!(pool.idle_count(), 1);

        // Unknown ids are ignored
        pool.release(HandleId::new(42));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_resolve_rejects_stale_streams() {
        let mut pool = HandlePool::new();
        let a = pool.acquire();
        let stream = pool.get(a).unwrap().stream();
        assert!(pool.resolve(&stream).is_some());

        pool.release(a);
        pool.acquire();
        assert!(pool.resolve(&stream).is_none());
    }
}
