use thiserror::Error;

use crate::backend::RenderBackend;
use crate::scene::QuadScene;
use crate::shader::ProgramError;

/// Why startup stopped.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// No rendering context could be acquired; nothing was compiled or drawn.
    #[error("rendering context unavailable: {0:#}")]
    ContextUnavailable(#[source] anyhow::Error),

    #[error(transparent)]
    Program(#[from] ProgramError),
}

/// A backend that completed scene setup, with the scene's resources.
pub struct Launched<B> {
    pub backend: B,
    pub scene: QuadScene,
}

/// An acquired backend whose scene is drawn on the first frame.
///
/// Window runtimes acquire the context as soon as the window exists but must
/// wait for the first redraw before presenting.
pub struct PendingLaunch<B> {
    backend: B,
    scene: Option<QuadScene>,
}

impl<B: RenderBackend> PendingLaunch<B> {
    /// Calls `acquire` once. On failure no backend call of any kind is made.
    pub fn acquire<F>(acquire: F) -> Result<Self, LaunchError>
    where
        F: FnOnce() -> anyhow::Result<B>,
    {
        let backend = acquire().map_err(LaunchError::ContextUnavailable)?;
        Ok(Self {
            backend,
            scene: None,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The scene, once the first frame has been drawn.
    pub fn scene(&self) -> Option<&QuadScene> {
        self.scene.as_ref()
    }

    /// Runs scene setup if it has not run yet.
    ///
    /// Returns `true` if this call drew the frame. Later calls touch nothing.
    pub fn draw_first_frame(&mut self) -> Result<bool, LaunchError> {
        if self.scene.is_some() {
            return Ok(false);
        }
        let scene = QuadScene::setup(&mut self.backend)?;
        self.scene = Some(scene);
        Ok(true)
    }
}

/// Acquires a backend and runs scene setup on it once.
///
/// `acquire` is called exactly once. If it fails, no backend call of any kind
/// is made.
pub fn launch<B, F>(acquire: F) -> Result<Launched<B>, LaunchError>
where
    B: RenderBackend,
    F: FnOnce() -> anyhow::Result<B>,
{
    let PendingLaunch { mut backend, .. } = PendingLaunch::acquire(acquire)?;
    let scene = QuadScene::setup(&mut backend)?;
    Ok(Launched { backend, scene })
}
