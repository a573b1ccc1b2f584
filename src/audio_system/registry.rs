/// Active-stream registry
///
/// Two ordered lists of handles currently in use, one per category.
/// A handle is listed in at most one of them.
use super::handle::HandleId;
use super::source::AudioCategory;

#[derive(Debug, Default)]
pub struct StreamRegistry {
    sounds: Vec<HandleId>,
    music: Vec<HandleId>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, category: AudioCategory) -> &Vec<HandleId> {
        match category {
            AudioCategory::Sound => &self.sounds,
            AudioCategory::Music => &self.music,
        }
    }

    fn list_mut(&mut self, category: AudioCategory) -> &mut Vec<HandleId> {
        match category {
            AudioCategory::Sound => &mut self.sounds,
            AudioCategory::Music => &mut self.music,
        }
    }

    /// Register a handle; returns false if it was already listed under `category`
    pub fn add(&mut self, id: HandleId, category: AudioCategory) -> bool {
        if self.list(category).contains(&id) {
            return false;
        }

        for other in AudioCategory::ALL {
            if other != category {
                self.list_mut(other).retain(|listed| *listed != id);
            }
        }

        self.list_mut(category).push(id);
        true
    }

    /// Unregister a handle; returns false if it was not listed
    pub fn remove(&mut self, id: HandleId, category: AudioCategory) -> bool {
        let list = self.list_mut(category);
        match list.iter().position(|listed| *listed == id) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: HandleId, category: AudioCategory) -> bool {
        self.list(category).contains(&id)
    }

    /// Category a handle is currently listed under
    pub fn category_of(&self, id: HandleId) -> Option<AudioCategory> {
        AudioCategory::ALL
            .into_iter()
            .find(|category| self.contains(id, *category))
    }

    pub fn active(&self, category: AudioCategory) -> &[HandleId] {
        self.list(category)
    }

    /// Remove and return every handle of a category, most recent first
    pub fn take_all(&mut self, category: AudioCategory) -> Vec<HandleId> {
        let mut taken = std::mem::take(self.list_mut(category));
        taken.reverse();
        taken
    }

    pub fn len(&self, category: AudioCategory) -> usize {
        self.list(category).len()
    }

    pub fn total(&self) -> usize {
        self.sounds.len() + self.music.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
