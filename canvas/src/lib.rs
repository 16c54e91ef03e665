//! Diagram editor engine for the lecture authoring tool.
//!
//! This crate is compiled to WebAssembly and runs in the browser next to the
//! markup editor. It owns the full lifecycle of the diagram canvas: translating
//! raw pointer and keyboard input into shape mutations, maintaining the pan/zoom
//! view, hit-testing and snapping against existing shapes, recording undo
//! history, drawing the scene, and emitting TikZ code that the author pastes
//! back into the lecture document.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EditorSession`] (testable core) and the canvas-bound [`engine::Engine`] |
//! | [`doc`] | Shape primitives and the ordered shape store |
//! | [`camera`] | View state (pan/zoom) and screen/world conversions |
//! | [`input`] | Tools, pointer/keyboard types, and the gesture state machine |
//! | [`hit`] | Distance functions, hit-testing, snapping, selection handles |
//! | [`history`] | Linear undo/redo over full shape snapshots |
//! | [`render`] | Scene rendering onto a 2D canvas context |
//! | [`dialect`] | TikZ code generation and parsing |
//! | [`svg`] | Standalone SVG export of a shape list |
//! | [`templates`] | Physics presets (springs, pulleys, surfaces) |
//! | [`consts`] | Shared numeric constants (thresholds, zoom limits, grid) |

pub mod camera;
pub mod consts;
pub mod dialect;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod history;
pub mod input;
pub mod render;
pub mod svg;
pub mod templates;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{DiagramEditor, install_browser_hooks};
