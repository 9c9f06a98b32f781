//! World Context
//!
//! [`World`] replaces process-wide named registries with one shared object
//! passed to every scene: actors, loaded resources, the event bus and the
//! engine settings. Scene teardown is an explicit operation on it.

use std::any::Any;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use parking_lot::RwLock;

use crate::errors::{Result, TundraError};
use crate::settings::EngineSettings;

use super::actor::{Actor, ActorTag};
use super::camera::{ORBIT_EVENT, ZOOM_EVENT};
use super::event::{EventArg, EventBus, HandlerId};
use super::registry::{AnyRegistry, Registry};

/// Actor entry shared between the registry, scenes and event handlers.
pub type SharedActor = Arc<RwLock<Actor>>;

pub struct World {
    pub settings: EngineSettings,
    pub actors: Registry<RwLock<Actor>>,
    pub resources: AnyRegistry,
    pub events: EventBus,
}

impl World {
    #[must_use]
    pub fn new(settings: EngineSettings) -> Self {
        let events = EventBus::new(settings.events.missing_handler);
        Self {
            settings,
            actors: Registry::new("actors"),
            resources: AnyRegistry::new("resources"),
            events,
        }
    }

    #[must_use]
    pub fn shared(settings: EngineSettings) -> Arc<Self> {
        Arc::new(Self::new(settings))
    }

    // ========================================================================
    // Actors
    // ========================================================================

    /// Registers an actor under its own name.
    pub fn spawn(&self, actor: Actor) -> Result<SharedActor> {
        let name = actor.name.clone();
        let entry = self.actors.insert(&name, RwLock::new(actor))?;
        log::debug!("Spawned actor '{name}'");
        Ok(entry)
    }

    pub fn actor(&self, name: &str) -> Result<SharedActor> {
        self.actors.get(name)
    }

    /// Looks up an actor and checks its kind.
    pub fn actor_of(&self, name: &str, tag: ActorTag) -> Result<SharedActor> {
        let actor = self.actors.get(name)?;
        if actor.read().tag() != tag {
            return Err(TundraError::TypeMismatch {
                name: name.to_string(),
                expected: match tag {
                    ActorTag::Avatar => "avatar",
                    ActorTag::Boss => "boss",
                    ActorTag::Camera => "camera",
                    ActorTag::Prop => "prop",
                },
            });
        }
        Ok(actor)
    }

    pub fn despawn(&self, name: &str) -> Option<SharedActor> {
        self.actors.remove(name)
    }

    /// Recomposes the transform of every actor whose pose changed.
    /// Returns how many were recomposed.
    pub fn compose_transforms(&self) -> usize {
        let settings = &self.settings.transform;
        let actors = self.actors.read_lock();
        let mut recomposed = 0;
        for actor in actors.values() {
            let mut actor = actor.write();
            if actor.transform.is_stale() {
                actor.compose_transform(settings);
                recomposed += 1;
            }
        }
        recomposed
    }

    /// Moves a camera actor after its subject and returns the new position.
    pub fn follow_camera(&self, camera_name: &str, delta_time: f32) -> Result<Vec3> {
        let camera = self.actor_of(camera_name, ActorTag::Camera)?;
        let subject = camera.read().camera_rig().and_then(|rig| rig.subject.clone());
        let subject_position = match subject {
            Some(subject) => self.actor(&subject)?.read().position(),
            None => camera.read().camera_rig().map_or(Vec3::ZERO, |rig| rig.focus),
        };

        let mut camera = camera.write();
        let position = camera.position();
        let Some(rig) = camera.camera_rig_mut() else {
            return Err(TundraError::TypeMismatch {
                name: camera_name.to_string(),
                expected: "camera",
            });
        };
        let position = rig.follow(position, subject_position, delta_time);
        camera.transform.position = position;
        Ok(position)
    }

    /// View and projection of a camera actor.
    pub fn camera_matrices(&self, camera_name: &str, aspect_ratio: f32) -> Result<(Mat4, Mat4)> {
        let camera = self.actor_of(camera_name, ActorTag::Camera)?;
        let camera = camera.read();
        let position = camera.position();
        let rig = camera.camera_rig().ok_or_else(|| TundraError::TypeMismatch {
            name: camera_name.to_string(),
            expected: "camera",
        })?;
        Ok((rig.view_matrix(position), rig.projection_matrix(aspect_ratio)))
    }

    // ========================================================================
    // Resources
    // ========================================================================

    pub fn insert_resource<T: Any + Send + Sync>(&self, name: &str, value: T) -> Result<Arc<T>> {
        self.resources.insert_any(name, value)
    }

    pub fn resource<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.resources.get_as::<T>(name)
    }

    /// Returns the resource loaded under `name`, loading it with `load` on
    /// first use. Scenes that share an asset receive the same `Arc`.
    pub fn resource_or_insert_with<T: Any + Send + Sync>(&self, name: &str, load: impl FnOnce() -> T) -> Result<Arc<T>> {
        self.resources.get_or_insert_any_with(name, load)
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub fn dispatch(&self, key: &str, args: &[EventArg]) -> Result<usize> {
        self.events.dispatch(key, args)
    }

    /// Routes zoom and orbit input events to a camera actor.
    ///
    /// The handlers hold the actor entry itself, so they keep working for as
    /// long as the keys stay subscribed, independent of the registry.
    pub fn bind_camera_input(&self, camera_name: &str) -> Result<[HandlerId; 2]> {
        let camera = self.actor_of(camera_name, ActorTag::Camera)?;

        let zoom_target = Arc::clone(&camera);
        let zoom = self.events.subscribe(ZOOM_EVENT, move |args| {
            let zoom_in = args.first().and_then(EventArg::as_number).unwrap_or(0.0);
            let zoom_out = args.get(1).and_then(EventArg::as_number).unwrap_or(0.0);
            if let Some(rig) = zoom_target.write().camera_rig_mut() {
                rig.zoom(zoom_in - zoom_out);
            }
        });

        let orbit = self.events.subscribe(ORBIT_EVENT, move |args| {
            let panorama = args.first().and_then(EventArg::as_number).unwrap_or(0.0);
            let elevation = args.get(1).and_then(EventArg::as_number).unwrap_or(0.0);
            if let Some(rig) = camera.write().camera_rig_mut() {
                rig.orbit(panorama, elevation);
            }
        });

        Ok([zoom, orbit])
    }
}
