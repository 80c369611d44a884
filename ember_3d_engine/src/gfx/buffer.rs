/// GPU buffer: vertex, index and uniform storage
///
/// A Buffer keeps a CPU copy of its contents next to the backend object.
/// Uniform buffers attached to a shader are re-pushed from that copy before
/// every draw.

use std::sync::Mutex;

use crate::error::Result;
use crate::{engine_bail, engine_error};
use crate::gfx::gpu_object::{DestroyFlag, GpuObject};
use crate::gfx::{Context, GpuHandle};
use crate::utils::lock;

/// Buffer binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferType {
    /// Per-vertex data
    Vertex,
    /// u32 element indices
    Index,
    /// Shader uniform block
    Uniform,
}

/// Expected access pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    DynamicDraw,
    DynamicRead,
    StaticDraw,
    StaticRead,
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone, PartialEq)]
pub struct BufferDesc {
    pub buffer_type: BufferType,
    pub usage: BufferUsage,
    /// Size in bytes
    pub size: usize,
    /// Initial contents; shorter data is zero-padded up to `size`
    pub data: Option<Vec<u8>>,
}

impl BufferDesc {
    /// Buffer of `size` bytes without initial contents
    pub fn new(buffer_type: BufferType, usage: BufferUsage, size: usize) -> Self {
        Self { buffer_type, usage, size, data: None }
    }

    /// Buffer sized and filled from `data`
    pub fn with_data(buffer_type: BufferType, usage: BufferUsage, data: Vec<u8>) -> Self {
        Self { buffer_type, usage, size: data.len(), data: Some(data) }
    }
}

/// GPU buffer created from a [`BufferDesc`]
#[derive(Debug)]
pub struct Buffer {
    handle: GpuHandle,
    buffer_type: BufferType,
    usage: BufferUsage,
    contents: Mutex<Vec<u8>>,
    destroyed: DestroyFlag,
}

impl Buffer {
    /// Create a buffer on the context's backend
    ///
    /// # Errors
    ///
    /// Returns an error if the size is zero, if the initial data is larger
    /// than the buffer, or if the backend rejects the allocation.
    pub fn create(context: &Context, desc: &BufferDesc) -> Result<Self> {
        // ========== VALIDATION ==========
        if desc.size == 0 {
            engine_bail!("ember3d::Buffer", "Buffer size must be non-zero");
        }
        if let Some(data) = &desc.data {
            if data.len() > desc.size {
                engine_bail!("ember3d::Buffer",
                    "Initial data ({} bytes) exceeds buffer size ({} bytes)", data.len(), desc.size);
            }
        }

        // ========== CPU COPY ==========
        let mut contents = vec![0u8; desc.size];
        if let Some(data) = &desc.data {
            contents[..data.len()].copy_from_slice(data);
        }

        // ========== BACKEND OBJECT ==========
        let backend_desc = BufferDesc {
            buffer_type: desc.buffer_type,
            usage: desc.usage,
            size: desc.size,
            data: desc.data.as_ref().map(|_| contents.clone()),
        };
        let handle = context.device().create_buffer(&backend_desc)?;

        Ok(Self {
            handle,
            buffer_type: desc.buffer_type,
            usage: desc.usage,
            contents: Mutex::new(contents),
            destroyed: DestroyFlag::default(),
        })
    }

    /// Write `data` at `offset`
    ///
    /// Capacity is not enforced: a write past the end grows the buffer.
    /// A range that overflows `usize` is logged and ignored.
    pub fn update(&self, context: &Context, offset: usize, data: &[u8]) {
        let Some(end) = offset.checked_add(data.len()) else {
            engine_error!("ember3d::Buffer",
                "Update of buffer {} at offset {} overflows ({} bytes)", self.handle, offset, data.len());
            return;
        };
        let mut device = context.device();
        let mut contents = lock(&self.contents);
        if end > contents.len() {
            contents.resize(end, 0);
        }
        contents[offset..end].copy_from_slice(data);
        device.update_buffer(self.handle, offset, data);
    }

    // ===== ACCESSORS =====

    pub fn buffer_type(&self) -> BufferType {
        self.buffer_type
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Current size in bytes
    pub fn size(&self) -> usize {
        lock(&self.contents).len()
    }

    /// Copy of the current contents
    pub fn contents(&self) -> Vec<u8> {
        lock(&self.contents).clone()
    }

    /// Description matching the current state of the buffer
    pub fn desc(&self) -> BufferDesc {
        let contents = self.contents();
        BufferDesc {
            buffer_type: self.buffer_type,
            usage: self.usage,
            size: contents.len(),
            data: Some(contents),
        }
    }

    /// Run `f` on the contents without copying them
    pub(crate) fn with_contents<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(&lock(&self.contents))
    }
}

impl GpuObject for Buffer {
    fn label(&self) -> &'static str {
        "Buffer"
    }

    fn handle(&self) -> GpuHandle {
        self.handle
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.is_set()
    }

    fn destroy(&self, context: &Context) {
        if self.destroyed.mark() {
            context.device().destroy_buffer(self.handle);
        }
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
