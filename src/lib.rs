#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod assets;
pub mod collision;
pub mod engine;
pub mod errors;
pub mod render;
pub mod scene;
pub mod settings;
pub mod shadow;
pub mod utils;

pub use animation::{AnimatedModel, AnimationClip, AnimationSequencer, Keyframe};
pub use assets::{AssetProvider, MemoryAssetProvider, ModelAsset};
pub use collision::{BoundingBox, CollisionMesh, Faces, Frustum, Winding};
pub use engine::Engine;
pub use errors::{Result, TundraError};
pub use render::{CommandSink, RecordingSink};
pub use scene::{Actor, ActorKind, ActorTag, CameraRig, EventBus, SceneLogic, SceneManager, Transform, World};
pub use settings::EngineSettings;
pub use shadow::CascadedShadowMap;
pub use utils::time::Timer;
