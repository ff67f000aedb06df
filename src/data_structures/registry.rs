//! Entity/component registry with a fixed set of component kinds.
//!
//! Entities are `index + generation` handles. Every component kind lives in
//! its own [`SparseSet`], so single-kind iteration ("views") walks packed
//! storage. Iteration order is the physical storage order, never creation
//! order. The draw pass re-sorts the [`Renderable`] storage every frame and
//! then walks it joined with [`Transform`] (the "drawables" group).
//!
//! # Key types
//!
//! - [`Entity`] is an opaque, copyable handle; stale handles resolve to nothing
//! - [`Component`] is implemented for exactly [`Tag`], [`Transform`],
//!   [`Renderable`], [`Camera`] and [`BehaviourSet`]
//! - [`EntityMut`] is the per-entity capability handed to behaviours

use std::{cmp::Ordering, fmt};

use cgmath::Matrix4;

use crate::{
    behaviour::{BehaviourContext, BehaviourSet},
    camera::Camera,
    data_structures::{sparse_set::SparseSet, transform::Transform},
    render::Renderable,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}:{})", self.index, self.generation)
    }
}

/// Human readable name, attached to every entity on creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag(pub String);

/// All component storages. Kept apart from the entity bookkeeping so a
/// storage can be borrowed mutably while generations are read.
#[derive(Default)]
pub struct Storages {
    tags: SparseSet<Tag>,
    transforms: SparseSet<Transform>,
    renderables: SparseSet<Renderable>,
    cameras: SparseSet<Camera>,
    behaviours: SparseSet<BehaviourSet>,
}

mod sealed {
    pub trait Sealed {}
}

/// A component kind known to the registry. The set is closed.
pub trait Component: sealed::Sealed + Sized + 'static {
    fn storage(storages: &Storages) -> &SparseSet<Self>;
    fn storage_mut(storages: &mut Storages) -> &mut SparseSet<Self>;
}

macro_rules! component {
    ($ty:ty, $field:ident) => {
        impl sealed::Sealed for $ty {}
        impl Component for $ty {
            fn storage(storages: &Storages) -> &SparseSet<Self> {
                &storages.$field
            }
            fn storage_mut(storages: &mut Storages) -> &mut SparseSet<Self> {
                &mut storages.$field
            }
        }
    };
}

component!(Tag, tags);
component!(Transform, transforms);
component!(Renderable, renderables);
component!(Camera, cameras);
component!(BehaviourSet, behaviours);

#[derive(Default)]
struct Entities {
    generations: Vec<u32>,
    live: Vec<bool>,
    free: Vec<u32>,
    count: usize,
}

impl Entities {
    fn is_alive(&self, entity: Entity) -> bool {
        let i = entity.index as usize;
        self.live.get(i).copied().unwrap_or(false) && self.generations[i] == entity.generation
    }

    fn handle(&self, index: u32) -> Entity {
        Entity {
            index,
            generation: self.generations[index as usize],
        }
    }
}

#[derive(Default)]
pub struct Registry {
    entities: Entities,
    storages: Storages,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entity carrying a [`Tag`] and an identity [`Transform`].
    pub fn create(&mut self, name: impl Into<String>) -> Entity {
        let index = match self.entities.free.pop() {
            Some(index) => index,
            None => {
                self.entities.generations.push(0);
                self.entities.live.push(false);
                self.entities.generations.len() as u32 - 1
            }
        };
        self.entities.live[index as usize] = true;
        self.entities.count += 1;
        let entity = self.entities.handle(index);
        self.storages.tags.insert(index, Tag(name.into()));
        self.storages.transforms.insert(index, Transform::new());
        entity
    }

    /// Drop the entity and all of its components. Returns false for stale handles.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.entities.is_alive(entity) {
            return false;
        }
        let index = entity.index;
        self.storages.tags.remove(index);
        self.storages.transforms.remove(index);
        self.storages.renderables.remove(index);
        self.storages.cameras.remove(index);
        self.storages.behaviours.remove(index);
        let slot = index as usize;
        self.entities.live[slot] = false;
        self.entities.generations[slot] = self.entities.generations[slot].wrapping_add(1);
        self.entities.free.push(index);
        self.entities.count -= 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn len(&self) -> usize {
        self.entities.count
    }

    pub fn is_empty(&self) -> bool {
        self.entities.count == 0
    }

    /// Attach or replace a component. Returns the replaced value.
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) -> Option<T> {
        if !self.entities.is_alive(entity) {
            log::warn!("insert on dead {entity} ignored");
            return None;
        }
        T::storage_mut(&mut self.storages).insert(entity.index, component)
    }

    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        T::storage_mut(&mut self.storages).remove(entity.index)
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        T::storage(&self.storages).get(entity.index)
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        T::storage_mut(&mut self.storages).get_mut(entity.index)
    }

    pub fn contains<T: Component>(&self, entity: Entity) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// Entities holding `T`, in storage order.
    pub fn view<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        let entities = &self.entities;
        T::storage(&self.storages)
            .iter()
            .map(move |(index, value)| (entities.handle(index), value))
    }

    pub fn view_mut<T: Component>(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        let entities = &self.entities;
        T::storage_mut(&mut self.storages)
            .iter_mut()
            .map(move |(index, value)| (entities.handle(index), value))
    }

    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.get::<Tag>(entity).map(|tag| tag.0.as_str())
    }

    pub fn find_by_name(&self, name: &str) -> Option<Entity> {
        self.view::<Tag>().find(|(_, tag)| tag.0 == name).map(|(entity, _)| entity)
    }

    /// Turn every camera with a queued target towards it. Targets are consumed.
    pub fn aim_cameras(&mut self) {
        let Storages {
            transforms, cameras, ..
        } = &mut self.storages;
        for (index, camera) in cameras.iter_mut() {
            let Some(target) = camera.take_target() else {
                continue;
            };
            match transforms.get_mut(index) {
                Some(transform) => {
                    transform.look_at(target, camera.up());
                }
                None => log::warn!("camera at index {index} has no transform to aim"),
            }
        }
    }

    /// Recompute every world matrix, parents before children.
    pub fn update_transforms(&mut self) {
        let has_parents = self.storages.transforms.iter().any(|(_, t)| t.parent().is_some());
        if !has_parents {
            self.storages
                .transforms
                .iter_mut()
                .for_each(|(_, t)| t.update_world_matrix(None));
            return;
        }

        let mut order: Vec<(usize, u32)> = self
            .storages
            .transforms
            .iter()
            .map(|(index, _)| (self.depth(index), index))
            .collect();
        order.sort_unstable();

        let entities = &self.entities;
        let transforms = &mut self.storages.transforms;
        for (_, index) in order {
            let parent_world: Option<Matrix4<f32>> = transforms
                .get(index)
                .and_then(|t| t.parent())
                .filter(|parent| entities.is_alive(*parent))
                .and_then(|parent| transforms.get(parent.index))
                .map(|parent| *parent.world_transform());
            if let Some(transform) = transforms.get_mut(index) {
                transform.update_world_matrix(parent_world.as_ref());
            }
        }
    }

    fn depth(&self, index: u32) -> usize {
        let transforms = &self.storages.transforms;
        let mut depth = 0;
        let mut current = transforms.get(index).and_then(|t| t.parent());
        while let Some(parent) = current {
            if !self.entities.is_alive(parent) || depth > transforms.len() {
                if depth > transforms.len() {
                    log::error!("transform parent cycle through entity index {index}");
                }
                break;
            }
            depth += 1;
            current = transforms.get(parent.index).and_then(|t| t.parent());
        }
        depth
    }

    /// Stable re-sort of the renderable storage.
    pub fn sort_drawables<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Renderable, &Renderable) -> Ordering,
    {
        self.storages
            .renderables
            .sort_by(|(_, a), (_, b)| compare(a, b));
    }

    /// Entities with both a [`Renderable`] and a [`Transform`], in renderable storage order.
    pub fn drawables(&self) -> impl Iterator<Item = (Entity, &Renderable, &Transform)> {
        let entities = &self.entities;
        let transforms = &self.storages.transforms;
        self.storages.renderables.iter().filter_map(move |(index, renderable)| {
            transforms
                .get(index)
                .map(|transform| (entities.handle(index), renderable, transform))
        })
    }

    /// Run every enabled behaviour of every entity, in attachment order.
    pub fn run_behaviours(&mut self, ctx: &BehaviourContext<'_>) {
        let Storages {
            transforms,
            cameras,
            behaviours,
            ..
        } = &mut self.storages;
        for (index, set) in behaviours.iter_mut() {
            let mut handle = EntityMut {
                entity: self.entities.handle(index),
                transform: transforms.get_mut(index),
                camera: cameras.get_mut(index),
            };
            set.update(&mut handle, ctx);
        }
    }
}

/// Mutable access to the components a behaviour may drive on one entity.
pub struct EntityMut<'a> {
    entity: Entity,
    transform: Option<&'a mut Transform>,
    camera: Option<&'a mut Camera>,
}

impl<'a> EntityMut<'a> {
    pub fn new(entity: Entity, transform: Option<&'a mut Transform>, camera: Option<&'a mut Camera>) -> Self {
        Self {
            entity,
            transform,
            camera,
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn transform(&mut self) -> Option<&mut Transform> {
        self.transform.as_deref_mut()
    }

    pub fn camera(&mut self) -> Option<&mut Camera> {
        self.camera.as_deref_mut()
    }
}
