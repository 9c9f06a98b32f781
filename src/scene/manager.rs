//! Scene Manager
//!
//! Owns every registered scene and drives the active one. Scene switching is
//! deferred: [`SceneManager::transition`] only records the request and the
//! switch happens at the end of the next [`SceneManager::update`].
//!
//! # Preloading
//!
//! A scene may be initialized ahead of time on a background runtime with
//! [`SceneManager::preload`] while the current scene keeps running. The
//! foreground never waits for it; [`SceneManager::has_finished_preloading`]
//! is a non-blocking poll, and a transition to a scene that is still loading
//! is refused. Launched preloads always run to completion.
//!
//! # Ownership
//!
//! When a scene becomes active it takes ownership of every actor, event key
//! and resource present in the world at that moment. When it is switched
//! away from, its actors and event keys are removed from the world; its
//! resources are removed too when the scene asks to be regenerated.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use crate::errors::{Result, TundraError};
use crate::render::commands::CommandSink;
use crate::settings::SceneSettings;

use super::world::World;

/// String properties handed to a scene on initialization.
pub type Props = FxHashMap<String, String>;

/// Creates a fresh instance of a scene.
pub type SceneFactory = Arc<dyn Fn() -> Box<dyn SceneLogic> + Send + Sync>;

/// Lifecycle of a scene. The order of the variants is the lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SceneState {
    Awaiting = 0,
    Initializing = 1,
    Initialized = 2,
    Active = 3,
    Uninitializing = 4,
    Uninitialized = 5,
}

impl SceneState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Initializing,
            2 => Self::Initialized,
            3 => Self::Active,
            4 => Self::Uninitializing,
            5 => Self::Uninitialized,
            _ => Self::Awaiting,
        }
    }
}

impl fmt::Display for SceneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Behavior of one scene.
pub trait SceneLogic: Send {
    /// Loads the scene's actors, resources and event handlers.
    ///
    /// May run on a background thread when the scene is preloaded.
    fn initialize(&mut self, world: &Arc<World>, props: &Props) -> Result<()>;

    /// Simulates one frame.
    fn update(&mut self, ctx: &SceneContext<'_>, delta_time: f32) -> Result<()>;

    /// Records the frame's draw commands.
    fn render(&mut self, world: &World, sink: &mut dyn CommandSink, delta_time: f32) -> Result<()>;

    /// Releases the scene. Returning `true` asks the manager to replace the
    /// instance with a fresh one from its factory and to drop the resources
    /// the scene owned.
    fn uninitialize(&mut self, _world: &World) -> bool {
        true
    }
}

/// What a scene sees during [`SceneLogic::update`].
pub struct SceneContext<'a> {
    pub world: &'a Arc<World>,
    pub manager: &'a SceneManager,
}

#[derive(Clone)]
struct StateCell(Arc<AtomicU8>);

impl StateCell {
    fn new() -> Self {
        Self(Arc::new(AtomicU8::new(SceneState::Awaiting as u8)))
    }

    fn get(&self) -> SceneState {
        SceneState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn set(&self, scene: &str, state: SceneState) {
        let previous = SceneState::from_u8(self.0.swap(state as u8, Ordering::AcqRel));
        log::debug!("Scene '{scene}': {previous} -> {state}");
    }
}

type SharedLogic = Arc<Mutex<Box<dyn SceneLogic>>>;

struct SceneSlot {
    logic: SharedLogic,
    factory: SceneFactory,
    state: StateCell,
}

#[derive(Default)]
struct OwnedNames {
    actors: Vec<String>,
    events: Vec<String>,
    resources: Vec<String>,
}

pub struct SceneManager {
    runtime: Runtime,
    scenes: RwLock<FxHashMap<String, SceneSlot>>,
    preloads: Mutex<FxHashMap<String, JoinHandle<Result<()>>>>,
    current: Mutex<Option<String>>,
    next: Mutex<Option<(String, Props)>>,
    owned: Mutex<FxHashMap<String, OwnedNames>>,
}

impl SceneManager {
    /// Creates the manager and its background preload runtime.
    pub fn new(settings: &SceneSettings) -> Result<Self> {
        let threads = settings.preload_worker_threads.max(1);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(threads)
            .max_blocking_threads(threads)
            .thread_name("tundra-preload")
            .build()?;

        Ok(Self {
            runtime,
            scenes: RwLock::new(FxHashMap::default()),
            preloads: Mutex::new(FxHashMap::default()),
            current: Mutex::new(None),
            next: Mutex::new(None),
            owned: Mutex::new(FxHashMap::default()),
        })
    }

    /// Registers a scene. The factory is called once now and again every
    /// time the scene asks to be regenerated.
    pub fn register<F>(&self, name: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn SceneLogic> + Send + Sync + 'static,
    {
        let mut scenes = self.scenes.write();
        if scenes.contains_key(name) {
            return Err(TundraError::DuplicateName {
                registry: "scenes",
                name: name.to_string(),
            });
        }

        let factory: SceneFactory = Arc::new(factory);
        scenes.insert(
            name.to_string(),
            SceneSlot {
                logic: Arc::new(Mutex::new(factory())),
                factory,
                state: StateCell::new(),
            },
        );
        log::debug!("Registered scene '{name}'");
        Ok(())
    }

    fn slot(&self, name: &str) -> Result<(SharedLogic, StateCell)> {
        self.scenes
            .read()
            .get(name)
            .map(|slot| (Arc::clone(&slot.logic), slot.state.clone()))
            .ok_or_else(|| TundraError::UnknownScene(name.to_string()))
    }

    /// Initializes `name` synchronously and makes it the active scene.
    pub fn boot(&self, name: &str, world: &Arc<World>, props: &Props) -> Result<()> {
        let (logic, state) = self.slot(name)?;
        if let Some(current) = self.current.lock().as_deref() {
            log::warn!("Booting '{name}' while '{current}' is active");
        }

        state.set(name, SceneState::Initializing);
        if let Err(err) = logic.lock().initialize(world, props) {
            state.set(name, SceneState::Awaiting);
            return Err(err);
        }
        state.set(name, SceneState::Initialized);
        state.set(name, SceneState::Active);

        self.amass(world, name);
        *self.current.lock() = Some(name.to_string());
        log::info!("Booted scene '{name}'");
        Ok(())
    }

    /// Starts initializing `name` on the background runtime.
    ///
    /// Launches at most one task per scene, and only for a scene that is
    /// still awaiting initialization. Returns `true` once the scene is
    /// initialized.
    pub fn preload(&self, name: &str, world: &Arc<World>) -> Result<bool> {
        let (logic, state) = self.slot(name)?;

        let mut preloads = self.preloads.lock();
        if !preloads.contains_key(name) && state.get() == SceneState::Awaiting {
            state.set(name, SceneState::Initializing);

            let world = Arc::clone(world);
            let scene = name.to_string();
            let task_state = state.clone();
            let handle = self.runtime.spawn_blocking(move || {
                let result = logic.lock().initialize(&world, &Props::default());
                match &result {
                    Ok(()) => task_state.set(&scene, SceneState::Initialized),
                    Err(err) => {
                        log::error!("Preloading scene '{scene}' failed: {err}");
                        task_state.set(&scene, SceneState::Awaiting);
                    }
                }
                result
            });
            preloads.insert(name.to_string(), handle);
            log::info!("Preloading scene '{name}'");
        }

        Ok(state.get() > SceneState::Initializing)
    }

    /// Non-blocking poll of the preload task of `name`.
    ///
    /// Returns `true` when no task is outstanding. A finished task is
    /// consumed; its error, if any, is returned here.
    pub fn has_finished_preloading(&self, name: &str) -> Result<bool> {
        let (_, state) = self.slot(name)?;

        let mut preloads = self.preloads.lock();
        let Some(handle) = preloads.get_mut(name) else {
            return Ok(true);
        };
        match handle.now_or_never() {
            None => Ok(false),
            Some(joined) => {
                preloads.remove(name);
                joined??;
                Ok(state.get() >= SceneState::Initialized)
            }
        }
    }

    /// Requests a switch to `name` at the end of the next update.
    ///
    /// Fails with [`TundraError::SceneBusy`] while the scene is still
    /// preloading. A pending request for another scene is replaced.
    pub fn transition(&self, name: &str, props: Props) -> Result<()> {
        if !self.has_finished_preloading(name)? {
            return Err(TundraError::SceneBusy(name.to_string()));
        }

        let mut next = self.next.lock();
        if let Some((pending, _)) = next.as_ref() {
            log::warn!("Transition to '{name}' replaces pending transition to '{pending}'");
        }
        *next = Some((name.to_string(), props));
        Ok(())
    }

    /// Runs the active scene for one frame, then performs a requested switch.
    ///
    /// Returns `false` on the frame a switch happened; the new scene has not
    /// been updated yet, so that frame should not be rendered.
    pub fn update(&self, world: &Arc<World>, delta_time: f32) -> Result<bool> {
        let current = self.current.lock().clone().ok_or(TundraError::NoActiveScene)?;
        let (logic, _) = self.slot(&current)?;
        logic.lock().update(
            &SceneContext {
                world,
                manager: self,
            },
            delta_time,
        )?;
        drop(logic);

        let Some((next, props)) = self.next.lock().take() else {
            return Ok(true);
        };
        self.switch(world, &current, &next, &props)?;
        Ok(false)
    }

    fn switch(&self, world: &Arc<World>, current: &str, next: &str, props: &Props) -> Result<()> {
        let (logic, state) = self.slot(current)?;
        state.set(current, SceneState::Uninitializing);
        let regenerate = logic.lock().uninitialize(world);
        drop(logic);
        state.set(current, SceneState::Uninitialized);

        let owned = self.owned.lock().remove(current).unwrap_or_default();
        if regenerate {
            if let Some(slot) = self.scenes.write().get_mut(current) {
                slot.logic = Arc::new(Mutex::new((slot.factory)()));
            }
            for name in &owned.resources {
                world.resources.remove(name);
            }
            log::debug!("Regenerated scene '{current}'");
        }
        state.set(current, SceneState::Awaiting);

        let (next_logic, next_state) = self.slot(next)?;
        if next_state.get() < SceneState::Initializing {
            next_state.set(next, SceneState::Initializing);
            if let Err(err) = next_logic.lock().initialize(world, props) {
                next_state.set(next, SceneState::Awaiting);
                return Err(TundraError::SceneInit {
                    scene: next.to_string(),
                    reason: err.to_string(),
                });
            }
            next_state.set(next, SceneState::Initialized);
        }
        next_state.set(next, SceneState::Active);

        for name in &owned.actors {
            world.actors.remove(name);
        }
        for key in &owned.events {
            world.events.erase(key);
        }
        self.amass(world, next);

        *self.current.lock() = Some(next.to_string());
        log::info!("Switched scene '{current}' -> '{next}'");
        Ok(())
    }

    fn amass(&self, world: &World, scene: &str) {
        let names = OwnedNames {
            actors: world.actors.names(),
            events: world.events.keys(),
            resources: world.resources.names(),
        };
        self.owned.lock().insert(scene.to_string(), names);
    }

    /// Records the active scene's draw commands.
    pub fn render(&self, world: &World, sink: &mut dyn CommandSink, delta_time: f32) -> Result<()> {
        let current = self.current.lock().clone().ok_or(TundraError::NoActiveScene)?;
        let (logic, _) = self.slot(&current)?;
        let mut logic = logic.lock();
        logic.render(world, sink, delta_time)
    }

    /// Waits for outstanding preloads, uninitializes the active scene and
    /// drops every scene.
    pub fn shutdown(&self, world: &World) -> Result<()> {
        let handles: Vec<_> = self.preloads.lock().drain().collect();
        for (name, handle) in handles {
            if let Err(err) = self.runtime.block_on(handle)? {
                log::warn!("Preload of '{name}' finished with an error: {err}");
            }
        }

        if let Some(current) = self.current.lock().take() {
            let (logic, state) = self.slot(&current)?;
            state.set(&current, SceneState::Uninitializing);
            logic.lock().uninitialize(world);
            state.set(&current, SceneState::Uninitialized);
        }
        self.next.lock().take();
        self.owned.lock().clear();
        self.scenes.write().clear();
        log::info!("Scene manager shut down");
        Ok(())
    }

    pub fn state(&self, name: &str) -> Result<SceneState> {
        self.slot(name).map(|(_, state)| state.get())
    }

    #[must_use]
    pub fn current_scene(&self) -> Option<String> {
        self.current.lock().clone()
    }

    /// Registered scene names, sorted.
    #[must_use]
    pub fn scene_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scenes.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }
}
