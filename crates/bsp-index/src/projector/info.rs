//! Reference-counted projector records.

use std::fmt;

use bitflags::bitflags;
use log::trace;
use nalgebra::{Point3, Unit, Vector3};

use crate::error::{ModelError, ModelResult};

/// Handle to a projector in a [`ProjectorArena`].
///
/// Slots are reused once a projector is destroyed, but each reuse bumps the
/// slot's generation, so a handle to a destroyed projector never resolves
/// to its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectorId {
    index: u32,
    generation: u32,
}

impl ProjectorId {
    /// Slot index inside the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ProjectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

bitflags! {
    /// Projection options.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ProjectorFlags: u32 {
        /// Also project onto surfaces facing away from the projector.
        const PROJECT_ON_BACKFACES = 1 << 0;
        /// Fade linearly with distance along the projector axis.
        const GRADIENT = 1 << 1;
    }
}

/// How a projected texture is combined with the surface below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectorBlend {
    /// Multiplies the surface colour.
    #[default]
    Modulate,
    /// Alpha blended over the surface.
    AlphaBlend,
    /// Added to the surface colour.
    Additive,
    /// Composited with the surface texture; needs base-surface UVs.
    Overlay,
}

impl ProjectorBlend {
    /// Returns `true` if this mode samples the underlying surface texture.
    #[inline]
    pub fn needs_base_uvs(self) -> bool {
        matches!(self, ProjectorBlend::Overlay)
    }
}

/// Static description of a projector, supplied by the projector actor.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectorDesc {
    /// Projector position.
    pub origin: Point3<f32>,
    /// Direction the projector shines in.
    pub direction: Unit<Vector3<f32>>,
    /// Distance along `direction` at which a gradient fades to zero.
    pub max_distance: f32,
    /// Projection options.
    pub flags: ProjectorFlags,
    /// Blend mode.
    pub blend: ProjectorBlend,
    /// Absolute time after which the projector expires.
    pub expires_at: Option<f32>,
}

impl ProjectorDesc {
    /// A modulating projector with no gradient and no expiry.
    pub fn new(origin: Point3<f32>, direction: Unit<Vector3<f32>>, max_distance: f32) -> Self {
        Self {
            origin,
            direction,
            max_distance,
            flags: ProjectorFlags::empty(),
            blend: ProjectorBlend::default(),
            expires_at: None,
        }
    }

    /// Attenuation of the projection at `position` on a surface with unit
    /// `normal`, in `[0, 1]`.
    pub fn attenuation(&self, position: Point3<f32>, normal: &Vector3<f32>) -> f32 {
        let facing = -normal.dot(&self.direction.into_inner());
        let directional = if self.flags.contains(ProjectorFlags::PROJECT_ON_BACKFACES) {
            facing.abs()
        } else {
            facing.max(0.0)
        };

        let falloff = if self.flags.contains(ProjectorFlags::GRADIENT) && self.max_distance > 0.0 {
            let along = self.direction.dot(&(position - self.origin));
            (1.0 - along / self.max_distance).clamp(0.0, 1.0)
        } else {
            1.0
        };

        directional * falloff
    }
}

/// A live projector.
///
/// The creator holds one reference until the projector expires or is
/// released; every node attachment holds one more. The record is destroyed
/// when the count reaches zero.
#[derive(Debug, Clone)]
pub struct ProjectorInfo {
    desc: ProjectorDesc,
    reference_count: u32,
    creator_reference: bool,
    last_render_time: f32,
}

impl ProjectorInfo {
    fn new(desc: ProjectorDesc, now: f32) -> Self {
        Self {
            desc,
            reference_count: 1,
            creator_reference: true,
            last_render_time: now,
        }
    }

    #[inline]
    pub fn desc(&self) -> &ProjectorDesc {
        &self.desc
    }

    /// Total references, including the creator's.
    #[inline]
    pub fn reference_count(&self) -> u32 {
        self.reference_count
    }

    /// References held by node attachments.
    #[inline]
    pub fn attachment_count(&self) -> u32 {
        self.reference_count - u32::from(self.creator_reference)
    }

    /// Returns `true` once the projector has expired and dropped the
    /// creator's reference.
    #[inline]
    pub fn is_expired(&self) -> bool {
        !self.creator_reference
    }

    #[inline]
    pub fn last_render_time(&self) -> f32 {
        self.last_render_time
    }

    /// Marks the projector rendered at `now` and decides whether it should
    /// still be drawn. On expiry the creator's reference is dropped; the
    /// caller must then release it through the arena.
    fn render(&mut self, now: f32, idle_timeout: f32) -> RenderOutcome {
        if self.is_expired() {
            return RenderOutcome::Expired { dropped_reference: false };
        }
        let idle = now - self.last_render_time > idle_timeout;
        let timed_out = self.desc.expires_at.is_some_and(|at| now >= at);
        self.last_render_time = now;

        if idle || timed_out {
            self.creator_reference = false;
            RenderOutcome::Expired { dropped_reference: true }
        } else {
            RenderOutcome::Render
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderOutcome {
    Render,
    Expired { dropped_reference: bool },
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    info: Option<ProjectorInfo>,
}

/// Owner of every projector record of a model.
///
/// Destroyed records free their slot for the next projector, so storage is
/// bounded by the peak number of live projectors.
#[derive(Debug, Default)]
pub struct ProjectorArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl ProjectorArena {
    /// Creates a projector with the creator's reference.
    pub(crate) fn create(&mut self, desc: ProjectorDesc, now: f32) -> ProjectorId {
        let info = Some(ProjectorInfo::new(desc, now));
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.info = info;
                ProjectorId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    info,
                });
                ProjectorId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Returns the projector, or `None` once destroyed.
    pub fn get(&self, id: ProjectorId) -> Option<&ProjectorInfo> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.info.as_ref())
    }

    /// Number of live projectors.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterates over live projectors.
    pub fn iter(&self) -> impl Iterator<Item = (ProjectorId, &ProjectorInfo)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let id = ProjectorId {
                index: index as u32,
                generation: slot.generation,
            };
            slot.info.as_ref().map(|info| (id, info))
        })
    }

    fn get_mut(&mut self, id: ProjectorId) -> ModelResult<&mut ProjectorInfo> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.info.as_mut())
            .ok_or(ModelError::UnknownProjector(id))
    }

    pub(crate) fn add_reference(&mut self, id: ProjectorId) -> ModelResult<()> {
        self.get_mut(id)?.reference_count += 1;
        Ok(())
    }

    /// Restarts the idle timer, as a render at `now` would, without
    /// checking for expiry.
    pub(crate) fn touch(&mut self, id: ProjectorId, now: f32) -> ModelResult<()> {
        self.get_mut(id)?.last_render_time = now;
        Ok(())
    }

    /// Drops one reference, destroying the record at zero.
    ///
    /// # Panics
    /// Panics if the count is already zero.
    pub(crate) fn release(&mut self, id: ProjectorId) -> ModelResult<()> {
        let info = self.get_mut(id)?;
        assert!(info.reference_count > 0, "projector {id} released below zero");
        info.reference_count -= 1;
        if info.reference_count == 0 {
            self.destroy(id);
        }
        Ok(())
    }

    fn destroy(&mut self, id: ProjectorId) {
        let slot = &mut self.slots[id.index()];
        if let Some(info) = slot.info.take() {
            assert_eq!(
                info.reference_count, 0,
                "projector {id} destroyed with live references"
            );
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
            self.live -= 1;
            trace!("projector {id} destroyed");
        }
    }

    /// Renders the projector at `now`. Returns `false` if it expired (now or
    /// earlier); an expiry drops the creator's reference.
    pub(crate) fn render(
        &mut self,
        id: ProjectorId,
        now: f32,
        idle_timeout: f32,
    ) -> ModelResult<bool> {
        match self.get_mut(id)?.render(now, idle_timeout) {
            RenderOutcome::Render => Ok(true),
            RenderOutcome::Expired { dropped_reference } => {
                if dropped_reference {
                    trace!("projector {id} expired at {now}");
                    self.release(id)?;
                }
                Ok(false)
            }
        }
    }

    /// Drops the creator's reference if it is still held.
    pub(crate) fn release_creator(&mut self, id: ProjectorId) -> ModelResult<()> {
        let info = self.get_mut(id)?;
        if info.creator_reference {
            info.creator_reference = false;
            self.release(id)?;
        }
        Ok(())
    }
}
