/// Draw commands and the key they are sorted by

use glam::Mat4;
use rdst::RadixKey;
use slotmap::Key;

use crate::resource::{MaterialId, MeshId, ModelId, SharedStorage, SkyboxId};

/// Bits of the sort key holding the queue position
const QUEUE_INDEX_BITS: u32 = 24;

/// What a command draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renderable {
    Mesh(MeshId),
    Model(ModelId),
    Skybox(SkyboxId),
}

impl Renderable {
    /// Pass order: meshes, then models, then the skybox
    pub fn order(&self) -> u8 {
        match self {
            Renderable::Mesh(_) => 0,
            Renderable::Model(_) => 1,
            Renderable::Skybox(_) => 2,
        }
    }
}

/// One queued draw: a renderable, its material and transform
///
/// The renderable and the material are looked up in `storage`.
#[derive(Debug, Clone)]
pub struct RenderCommand {
    pub renderable: Renderable,
    pub material: MaterialId,
    pub transform: Mat4,
    pub storage: SharedStorage,
}

impl RenderCommand {
    pub fn new(renderable: Renderable, material: MaterialId, storage: &SharedStorage) -> Self {
        Self {
            renderable,
            material,
            transform: Mat4::IDENTITY,
            storage: SharedStorage::clone(storage),
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }
}

/// Counters for one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Commands queued
    pub commands: usize,
    /// Draws issued (a model issues one per mesh)
    pub draw_calls: usize,
    /// Commands dropped because a resource was missing or a draw failed
    pub skipped: usize,
}

/// Sort key: pass order, then material slot, then queue position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DrawKey {
    pub key: u64,
    pub index: u32,
}

impl DrawKey {
    pub(crate) fn new(command: &RenderCommand, index: usize) -> Self {
        let material = command.material.data().as_ffi() & 0xFFFF_FFFF;
        let position = index as u64 & ((1 << QUEUE_INDEX_BITS) - 1);
        Self {
            key: (u64::from(command.renderable.order()) << 56)
                | (material << QUEUE_INDEX_BITS)
                | position,
            index: index as u32,
        }
    }
}

impl RadixKey for DrawKey {
    const LEVELS: usize = 8;

    #[inline]
    fn get_level(&self, level: usize) -> u8 {
        (self.key >> (level * 8)) as u8
    }
}
