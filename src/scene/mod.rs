//! Scene Runtime
//!
//! Everything a running game scene works with:
//! - [`Transform`]: actor pose and composed matrix
//! - [`Actor`]: avatars, bosses, cameras and props with per-kind behavior
//! - [`CameraRig`]: third-person orbit camera
//! - [`Registry`] / [`EventBus`]: named storage and multicast events
//! - [`World`]: the shared context holding the above
//! - [`SceneManager`]: scene lifecycle, switching and background preloading

pub mod actor;
pub mod camera;
pub mod event;
pub mod manager;
pub mod registry;
pub mod transform;
pub mod world;

pub use actor::{Actor, ActorKind, ActorTag, AvatarState, BossState, CollisionResponse};
pub use camera::CameraRig;
pub use event::{EventArg, EventArgs, EventBus, HandlerId, MissingHandlerPolicy};
pub use manager::{Props, SceneContext, SceneLogic, SceneManager, SceneState};
pub use registry::{AnyRegistry, Registry};
pub use transform::{CoordinateSystem, Transform};
pub use world::{SharedActor, World};
