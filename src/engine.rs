//! Engine Core Module
//!
//! [`Engine`] ties the shared [`World`], the [`SceneManager`] and the frame
//! [`Timer`] together. It has no window or device of its own: the host
//! drives it once per frame and hands in the [`CommandSink`] that receives
//! the frame's draw commands.
//!
//! # Example
//!
//! ```rust,ignore
//! use tundra::{Engine, EngineSettings, RecordingSink};
//!
//! let mut engine = Engine::new(EngineSettings::default())?;
//! engine.scenes().register("title", || Box::new(TitleScene::default()))?;
//! engine.boot("title", &Default::default())?;
//!
//! let mut sink = RecordingSink::new();
//! loop {
//!     sink.clear();
//!     engine.frame(&mut sink)?;
//! }
//! ```

use std::sync::Arc;

use crate::errors::Result;
use crate::render::commands::CommandSink;
use crate::scene::manager::{Props, SceneManager};
use crate::scene::world::World;
use crate::settings::EngineSettings;
use crate::utils::time::Timer;

pub struct Engine {
    world: Arc<World>,
    scenes: SceneManager,
    timer: Timer,
}

impl Engine {
    pub fn new(settings: EngineSettings) -> Result<Self> {
        let scenes = SceneManager::new(&settings.scene)?;
        Ok(Self {
            world: World::shared(settings),
            scenes,
            timer: Timer::new(),
        })
    }

    #[inline]
    #[must_use]
    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    #[inline]
    #[must_use]
    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    #[inline]
    #[must_use]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut Timer {
        &mut self.timer
    }

    /// Initializes the first scene and restarts the frame timer.
    pub fn boot(&mut self, scene: &str, props: &Props) -> Result<()> {
        self.scenes.boot(scene, &self.world, props)?;
        self.timer.reset();
        Ok(())
    }

    /// Simulates one frame of `delta_time` seconds and renders it unless a
    /// scene switch happened. Returns whether the frame was rendered.
    pub fn step(&mut self, sink: &mut dyn CommandSink, delta_time: f32) -> Result<bool> {
        let renderable = self.scenes.update(&self.world, delta_time)?;
        if renderable {
            self.world.compose_transforms();
            self.scenes.render(&self.world, sink, delta_time)?;
        }
        Ok(renderable)
    }

    /// Ticks the timer and steps with the measured delta.
    pub fn frame(&mut self, sink: &mut dyn CommandSink) -> Result<bool> {
        self.timer.tick();
        let delta_time = self.timer.dt_seconds();
        self.step(sink, delta_time)
    }

    /// Waits for background preloads and releases the active scene.
    pub fn shutdown(&mut self) -> Result<()> {
        self.scenes.shutdown(&self.world)
    }
}
