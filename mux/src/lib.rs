//! Window geometry, scene ordering and the composited render loop that
//! sit above `loomterm-term`'s per-window VTE.
//!
//! Grounded on `examples/wez-wezterm/mux`'s overall responsibility split
//! (a `Window` binds presentation state to one emulator; a scene-level
//! collaborator owns the set of windows, their order and focus) but
//! without wezterm's `Tab`/`Pane`/`Domain`/SSH/tmux/Lua layers — those
//! are PTY-spawning, scripting and remote-session machinery handled by
//! external collaborators, not part of this core.

pub mod renderer;
pub mod scene;
pub mod theme;
pub mod window;

pub use renderer::Renderer;
pub use scene::Scene;
pub use theme::Theme;
pub use window::{CloseBehavior, Rect, Transparency, TransparencyMode, Window, WindowId};
