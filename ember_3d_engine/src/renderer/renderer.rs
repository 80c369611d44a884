/// Forward renderer over resource storages
///
/// A pass clears the framebuffer and uploads the view-projection matrix to
/// a uniform buffer held in the renderer's own storage. Queued commands are
/// radix-sorted by pass order and material, then drawn one by one: the
/// matrices buffer is attached to the command's material, the transform
/// becomes its model matrix, preset uniforms are uploaded and the
/// renderable's pipeline is applied and drawn.

use std::sync::Arc;

use glam::{Mat4, Vec4};
use rdst::RadixSort;

use crate::error::Result;
use crate::gfx::{Buffer, BufferDesc, BufferType, BufferUsage, Context, PipelineTexture};
use crate::renderer::render_command::DrawKey;
use crate::renderer::{RenderCommand, RenderStats, Renderable};
use crate::resource::{
    ModelMaterial, ResourceStorage, SharedStorage, StorageManager,
    MATERIAL_MATRICES_BUFFER_INDEX,
};
use crate::utils::lock;
use crate::{engine_bail, engine_debug, engine_trace, engine_warn};

/// Name of the storage holding the renderer's own resources
pub const RENDERER_STORAGE_NAME: &str = "renderer";

pub struct Renderer {
    context: Arc<Context>,
    storage: SharedStorage,
    matrices: Arc<Buffer>,
    queue: Vec<RenderCommand>,
    clear_color: Vec4,
    in_pass: bool,
    last_stats: RenderStats,
}

impl Renderer {
    /// Create the renderer storage and its view-projection buffer
    pub fn new(context: Arc<Context>, storages: &mut StorageManager) -> Result<Self> {
        let storage = storages.create_storage(RENDERER_STORAGE_NAME, "");
        let matrices = {
            let mut guard = lock(&storage);
            let desc = BufferDesc::with_data(
                BufferType::Uniform,
                BufferUsage::DynamicDraw,
                bytemuck::bytes_of(&Mat4::IDENTITY).to_vec(),
            );
            let id = guard.push_buffer(&desc)?;
            match guard.get_buffer(id) {
                Some(buffer) => Arc::clone(buffer),
                None => engine_bail!("ember3d::Renderer", "View-projection buffer missing after push"),
            }
        };

        engine_debug!("ember3d::Renderer", "Renderer created");
        Ok(Self {
            context,
            storage,
            matrices,
            queue: Vec::new(),
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            in_pass: false,
            last_stats: RenderStats::default(),
        })
    }

    // ===== ACCESSORS =====

    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    /// Uniform buffer bound to every drawn material's matrices slot
    pub fn matrices_buffer(&self) -> &Arc<Buffer> {
        &self.matrices
    }

    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color;
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn last_stats(&self) -> RenderStats {
        self.last_stats
    }

    // ===== FRAME =====

    /// Clear the framebuffer and upload the view-projection matrix
    pub fn begin_pass(&mut self, view_projection: Mat4) {
        self.context.clear(self.clear_color);
        self.matrices.update(&self.context, 0, bytemuck::bytes_of(&view_projection));
        self.in_pass = true;
    }

    pub fn queue(&mut self, command: RenderCommand) {
        self.queue.push(command);
    }

    /// Sort and draw every queued command, emptying the queue
    ///
    /// A command whose resources cannot be found is skipped and counted;
    /// the rest of the pass still runs.
    pub fn end_pass(&mut self) -> Result<RenderStats> {
        if !self.in_pass {
            engine_warn!("ember3d::Renderer", "end_pass without begin_pass, matrices are stale");
        }
        self.in_pass = false;

        let commands = std::mem::take(&mut self.queue);
        let mut keys: Vec<DrawKey> = commands
            .iter()
            .enumerate()
            .map(|(index, command)| DrawKey::new(command, index))
            .collect();
        keys.radix_sort_unstable();

        let mut stats = RenderStats { commands: commands.len(), ..RenderStats::default() };
        for key in &keys {
            let command = &commands[key.index as usize];
            match self.draw_command(command) {
                Ok(draws) => stats.draw_calls += draws,
                Err(_) => stats.skipped += 1,
            }
        }

        engine_trace!("ember3d::Renderer", "Pass done: {:?}", stats);
        self.last_stats = stats;
        Ok(stats)
    }

    /// Swap buffers
    pub fn present(&self) {
        self.context.present();
    }

    // ===== DRAW =====

    fn draw_command(&self, command: &RenderCommand) -> Result<usize> {
        let mut storage = lock(&command.storage);

        let Some(material) = storage.get_material_mut(command.material) else {
            engine_bail!("ember3d::Renderer", "Command material is not in storage");
        };
        material.set_uniform_buffer(&self.context, MATERIAL_MATRICES_BUFFER_INDEX, &self.matrices)?;
        material.model_matrix = command.transform;

        let storage: &ResourceStorage = &storage;
        let Some(material) = storage.get_material(command.material) else {
            engine_bail!("ember3d::Renderer", "Command material is not in storage");
        };
        material.use_material(&self.context);

        match command.renderable {
            Renderable::Mesh(id) => {
                let Some(mesh) = storage.get_mesh(id) else {
                    engine_bail!("ember3d::Renderer", "Command mesh is not in storage '{}'", storage.name());
                };
                mesh.draw(&self.context, material, None)?;
                Ok(1)
            }
            Renderable::Model(id) => {
                let Some(model) = storage.get_model(id) else {
                    engine_bail!("ember3d::Renderer", "Command model is not in storage '{}'", storage.name());
                };
                let mut draws = 0;
                for (mesh_id, model_material) in model.parts() {
                    let Some(mesh) = storage.get_mesh(mesh_id) else {
                        continue;
                    };
                    let textures = model_material.and_then(|part| {
                        material.upload_colors(&self.context, part.ambient, part.diffuse, part.specular);
                        model_textures(storage, part)
                    });
                    mesh.draw(&self.context, material, textures)?;
                    draws += 1;
                }
                Ok(draws)
            }
            Renderable::Skybox(id) => {
                let Some(skybox) = storage.get_skybox(id) else {
                    engine_bail!("ember3d::Renderer", "Command skybox is not in storage '{}'", storage.name());
                };
                skybox.draw(&self.context, material)?;
                Ok(1)
            }
        }
    }
}

/// Textures a model material carries; `None` keeps the material's own maps
fn model_textures(storage: &ResourceStorage, part: &ModelMaterial) -> Option<Vec<PipelineTexture>> {
    let textures: Vec<PipelineTexture> = [part.diffuse_texture, part.specular_texture]
        .into_iter()
        .flatten()
        .filter_map(|id| storage.get_texture(id))
        .map(|texture| PipelineTexture::Texture(Arc::clone(texture)))
        .collect();
    (!textures.is_empty()).then_some(textures)
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("queued", &self.queue.len())
            .field("clear_color", &self.clear_color)
            .field("in_pass", &self.in_pass)
            .field("last_stats", &self.last_stats)
            .finish()
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
