//! Ordered entity pools
//!
//! Pools keep insertion order. Removal keeps the order of the survivors, so
//! walking indices from the back while removing never skips or repeats an
//! entity.

use glam::Vec3;

use super::aabb::Aabb;
use super::state::EntityHandle;

/// Anything that moves and collides
pub trait Body {
    fn handle(&self) -> EntityHandle;
    /// Bounds as of the last move
    fn bounds(&self) -> &Aabb;
    /// Move by `delta` and rebuild the bounds from the new position
    fn translate(&mut self, delta: Vec3);
}

#[derive(Debug, Clone)]
pub struct EntityPool<T> {
    items: Vec<T>,
}

impl<T> Default for EntityPool<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Body> EntityPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Remove the entity at `index`, shifting later entities down
    pub fn remove_at(&mut self, index: usize) -> T {
        self.items.remove(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Move every entity by `delta`, refreshing bounds
    pub fn translate_all(&mut self, delta: Vec3) {
        for item in &mut self.items {
            item.translate(delta);
        }
    }

    /// Remove every entity matching `pred`, back to front.
    /// Returns the removed handles in pool order.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> Vec<EntityHandle> {
        let mut removed = Vec::new();
        for i in (0..self.items.len()).rev() {
            if pred(&self.items[i]) {
                removed.push(self.items.remove(i).handle());
            }
        }
        removed.reverse();
        removed
    }

    /// Index of the first entity (in pool order) whose bounds hit `bounds`
    pub fn first_intersecting(&self, bounds: &Aabb) -> Option<usize> {
        self.items.iter().position(|item| item.bounds().intersects(bounds))
    }

    /// Empty the pool, returning the handles that were live
    pub fn clear(&mut self) -> Vec<EntityHandle> {
        self.items.drain(..).map(|item| item.handle()).collect()
    }
}

impl<'a, T> IntoIterator for &'a EntityPool<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
