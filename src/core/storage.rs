use std::collections::HashMap;

use crate::core::{BodyHandle, JointHandle};
use crate::error::PhysicsError;
use crate::Result;

/// Generic storage trait for physics objects
pub trait Storage<T, H> {
    /// Creates a new empty storage
    fn new() -> Self;

    /// Adds an item to the storage and returns its handle
    fn add(&mut self, item: T) -> H;

    /// Gets a reference to an item by its handle
    fn get(&self, handle: H) -> Option<&T>;

    /// Gets a mutable reference to an item by its handle
    fn get_mut(&mut self, handle: H) -> Option<&mut T>;

    /// Removes an item from the storage
    fn remove(&mut self, handle: H) -> Option<T>;

    /// Returns the number of items in the storage
    fn len(&self) -> usize;

    /// Returns whether the storage is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns all handles in insertion order
    fn handles(&self) -> Vec<H>;

    /// Clears all items from the storage
    fn clear(&mut self);
}

/// Insertion-ordered arena for rigid bodies.
///
/// Items live in a vector iterated in a fixed order (the solver passes are
/// order sensitive); removal is swap-remove with the handle map patched up.
pub struct BodyStorage<T> {
    items: Vec<(BodyHandle, T)>,
    index: HashMap<BodyHandle, usize>,
    next_id: u32,
}

impl<T> Storage<T, BodyHandle> for BodyStorage<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            // Start at 1, so 0 can represent an invalid handle
            next_id: 1,
        }
    }

    fn add(&mut self, item: T) -> BodyHandle {
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        self.index.insert(handle, self.items.len());
        self.items.push((handle, item));
        handle
    }

    fn get(&self, handle: BodyHandle) -> Option<&T> {
        self.index.get(&handle).map(|&i| &self.items[i].1)
    }

    fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut T> {
        let i = *self.index.get(&handle)?;
        Some(&mut self.items[i].1)
    }

    fn remove(&mut self, handle: BodyHandle) -> Option<T> {
        let i = self.index.remove(&handle)?;
        let (_, item) = self.items.swap_remove(i);
        if i < self.items.len() {
            self.index.insert(self.items[i].0, i);
        }
        Some(item)
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn handles(&self) -> Vec<BodyHandle> {
        self.items.iter().map(|(h, _)| *h).collect()
    }

    fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }
}

impl<T> BodyStorage<T> {
    /// Returns whether the storage contains the handle
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.index.contains_key(&handle)
    }

    /// Gets a body by its handle, returning an error if not found
    pub fn get_body(&self, handle: BodyHandle) -> Result<&T> {
        self.get(handle).ok_or_else(|| {
            PhysicsError::ResourceNotFound(format!("Body with handle {:?} not found", handle))
        })
    }

    /// Gets a mutable reference to a body, returning an error if not found
    pub fn get_body_mut(&mut self, handle: BodyHandle) -> Result<&mut T> {
        self.get_mut(handle).ok_or_else(|| {
            PhysicsError::ResourceNotFound(format!("Body with handle {:?} not found", handle))
        })
    }

    /// Gets disjoint mutable references to two different bodies.
    ///
    /// Required by the Gauss-Seidel passes, which read and write both bodies
    /// of a pair in a single call.
    pub fn get_pair_mut(&mut self, a: BodyHandle, b: BodyHandle) -> Result<(&mut T, &mut T)> {
        if a == b {
            return Err(PhysicsError::InvalidParameter(
                "cannot borrow the same body twice".into(),
            ));
        }

        let ia = *self.index.get(&a).ok_or_else(|| {
            PhysicsError::ResourceNotFound(format!("Body with handle {:?} not found", a))
        })?;
        let ib = *self.index.get(&b).ok_or_else(|| {
            PhysicsError::ResourceNotFound(format!("Body with handle {:?} not found", b))
        })?;

        if ia < ib {
            let (left, right) = self.items.split_at_mut(ib);
            Ok((&mut left[ia].1, &mut right[0].1))
        } else {
            let (left, right) = self.items.split_at_mut(ia);
            Ok((&mut right[0].1, &mut left[ib].1))
        }
    }

    /// Returns an iterator over all items in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &T)> {
        self.items.iter().map(|(h, item)| (*h, item))
    }

    /// Returns a mutable iterator over all items in insertion order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyHandle, &mut T)> {
        self.items.iter_mut().map(|(h, item)| (*h, item))
    }
}

/// Insertion-ordered arena for joints
pub struct JointStorage<T> {
    items: Vec<(JointHandle, T)>,
    index: HashMap<JointHandle, usize>,
    next_id: u32,
}

impl<T> Storage<T, JointHandle> for JointStorage<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            next_id: 1,
        }
    }

    fn add(&mut self, item: T) -> JointHandle {
        let handle = JointHandle(self.next_id);
        self.next_id += 1;
        self.index.insert(handle, self.items.len());
        self.items.push((handle, item));
        handle
    }

    fn get(&self, handle: JointHandle) -> Option<&T> {
        self.index.get(&handle).map(|&i| &self.items[i].1)
    }

    fn get_mut(&mut self, handle: JointHandle) -> Option<&mut T> {
        let i = *self.index.get(&handle)?;
        Some(&mut self.items[i].1)
    }

    fn remove(&mut self, handle: JointHandle) -> Option<T> {
        let i = self.index.remove(&handle)?;
        let (_, item) = self.items.swap_remove(i);
        if i < self.items.len() {
            self.index.insert(self.items[i].0, i);
        }
        Some(item)
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn handles(&self) -> Vec<JointHandle> {
        self.items.iter().map(|(h, _)| *h).collect()
    }

    fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }
}

impl<T> JointStorage<T> {
    /// Gets a joint by its handle, returning an error if not found
    pub fn get_joint(&self, handle: JointHandle) -> Result<&T> {
        self.get(handle).ok_or_else(|| {
            PhysicsError::ResourceNotFound(format!("Joint with handle {:?} not found", handle))
        })
    }

    /// Gets a mutable reference to a joint, returning an error if not found
    pub fn get_joint_mut(&mut self, handle: JointHandle) -> Result<&mut T> {
        self.get_mut(handle).ok_or_else(|| {
            PhysicsError::ResourceNotFound(format!("Joint with handle {:?} not found", handle))
        })
    }

    /// Returns an iterator over all items in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (JointHandle, &T)> {
        self.items.iter().map(|(h, item)| (*h, item))
    }

    /// Returns a mutable iterator over all items in insertion order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (JointHandle, &mut T)> {
        self.items.iter_mut().map(|(h, item)| (*h, item))
    }
}
