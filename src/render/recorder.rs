use rustc_hash::FxHashMap;

use super::{
    DecorationHandle, DecorationKind, DecorationPlacement, ExtrudedProfile, MeshDetail, MeshHandle,
    ProfileVertex, RenderBackend,
};
use crate::error::{TerrainError, TerrainErrorContext, TerrainResult};

/// Recorded state of one surface mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRecord {
    pub profile: ExtrudedProfile,
    pub attached: bool,
    pub detail: MeshDetail,
    pub byte_len: usize,
}

/// Recorded state of one decoration instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecorationRecord {
    pub kind: DecorationKind,
    pub placement: Option<DecorationPlacement>,
    pub visible: bool,
}

/// Headless renderer that records every call it receives
#[derive(Debug, Default)]
pub struct SceneRecorder {
    meshes: FxHashMap<MeshHandle, MeshRecord>,
    decorations: FxHashMap<DecorationHandle, DecorationRecord>,
    next_id: u64,
    meshes_created: u64,
    decorations_created: u64,
    detail_changes: u64,
    fail_next: u32,
}

impl SceneRecorder {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Make the next `count` calls fail
    pub fn fail_next_calls(&mut self, count: u32) {
        self.fail_next = count;
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&MeshRecord> {
        self.meshes.get(&handle)
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshHandle, &MeshRecord)> {
        self.meshes.iter().map(|(handle, record)| (*handle, record))
    }

    pub fn decoration(&self, handle: DecorationHandle) -> Option<&DecorationRecord> {
        self.decorations.get(&handle)
    }

    pub fn decorations(&self) -> impl Iterator<Item = (DecorationHandle, &DecorationRecord)> {
        self.decorations.iter().map(|(handle, record)| (*handle, record))
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn attached_mesh_count(&self) -> usize {
        self.meshes.values().filter(|m| m.attached).count()
    }

    /// Live decoration instances, visible or pooled
    pub fn decoration_count(&self) -> usize {
        self.decorations.len()
    }

    pub fn visible_decoration_count(&self) -> usize {
        self.decorations.values().filter(|d| d.visible).count()
    }

    pub fn meshes_created(&self) -> u64 {
        self.meshes_created
    }

    pub fn decorations_created(&self) -> u64 {
        self.decorations_created
    }

    pub fn detail_changes(&self) -> u64 {
        self.detail_changes
    }

    fn next_handle_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check_injected_failure(&mut self, operation: &str) -> TerrainResult<()> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(TerrainError::Render {
                operation: operation.to_string(),
                error: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn mesh_mut(&mut self, handle: MeshHandle) -> TerrainResult<&mut MeshRecord> {
        self.meshes.get_mut(&handle).ok_or(TerrainError::UnknownHandle {
            kind: "mesh",
            id: handle.0,
        })
    }

    fn decoration_mut(&mut self, handle: DecorationHandle) -> TerrainResult<&mut DecorationRecord> {
        self.decorations
            .get_mut(&handle)
            .ok_or(TerrainError::UnknownHandle {
                kind: "decoration",
                id: handle.0,
            })
    }
}

impl RenderBackend for SceneRecorder {
    fn create_extruded_surface_mesh(&mut self, profile: &ExtrudedProfile) -> TerrainResult<MeshHandle> {
        self.check_injected_failure("create_extruded_surface_mesh")?;
        if profile.points.len() < 3 {
            return Err(TerrainError::Render {
                operation: "create_extruded_surface_mesh".to_string(),
                error: format!("profile has only {} points", profile.points.len()),
            });
        }
        let bytes: &[u8] = bytemuck::try_cast_slice::<ProfileVertex, u8>(&profile.points)
            .render_context("create_extruded_surface_mesh")?;

        let handle = MeshHandle(self.next_handle_id());
        self.meshes.insert(
            handle,
            MeshRecord {
                profile: profile.clone(),
                attached: false,
                detail: MeshDetail::FULL,
                byte_len: bytes.len(),
            },
        );
        self.meshes_created += 1;
        Ok(handle)
    }

    fn dispose_mesh(&mut self, handle: MeshHandle) -> TerrainResult<()> {
        self.check_injected_failure("dispose_mesh")?;
        self.meshes
            .remove(&handle)
            .map(|_| ())
            .ok_or(TerrainError::UnknownHandle {
                kind: "mesh",
                id: handle.0,
            })
    }

    fn attach(&mut self, handle: MeshHandle) -> TerrainResult<()> {
        self.check_injected_failure("attach")?;
        self.mesh_mut(handle)?.attached = true;
        Ok(())
    }

    fn detach(&mut self, handle: MeshHandle) -> TerrainResult<()> {
        self.check_injected_failure("detach")?;
        self.mesh_mut(handle)?.attached = false;
        Ok(())
    }

    fn set_mesh_detail(&mut self, handle: MeshHandle, detail: MeshDetail) -> TerrainResult<()> {
        self.check_injected_failure("set_mesh_detail")?;
        self.mesh_mut(handle)?.detail = detail;
        self.detail_changes += 1;
        Ok(())
    }

    fn create_decoration(&mut self, kind: DecorationKind) -> TerrainResult<DecorationHandle> {
        self.check_injected_failure("create_decoration")?;
        let handle = DecorationHandle(self.next_handle_id());
        self.decorations.insert(
            handle,
            DecorationRecord {
                kind,
                placement: None,
                visible: false,
            },
        );
        self.decorations_created += 1;
        Ok(handle)
    }

    fn place_decoration(
        &mut self,
        handle: DecorationHandle,
        placement: DecorationPlacement,
    ) -> TerrainResult<()> {
        self.check_injected_failure("place_decoration")?;
        self.decoration_mut(handle)?.placement = Some(placement);
        Ok(())
    }

    fn set_decoration_visible(&mut self, handle: DecorationHandle, visible: bool) -> TerrainResult<()> {
        self.check_injected_failure("set_decoration_visible")?;
        self.decoration_mut(handle)?.visible = visible;
        Ok(())
    }

    fn dispose_decoration(&mut self, handle: DecorationHandle) -> TerrainResult<()> {
        self.check_injected_failure("dispose_decoration")?;
        self.decorations
            .remove(&handle)
            .map(|_| ())
            .ok_or(TerrainError::UnknownHandle {
                kind: "decoration",
                id: handle.0,
            })
    }
}
