//! Runtime controller
//!
//! Owns the single live rendering-engine view, feeds it specifications
//! produced by the exporter plus manipulator scaffolding, debounces and
//! cancels in-flight recompilations, and keeps signal listeners alive
//! across view recreation.

pub mod controller;
pub mod engine;
pub mod listeners;

pub use controller::{manipulator_spec, Controller, SpecProvider};
pub use engine::{EngineError, EngineView, RenderEngine, SignalHandler};
pub use listeners::ListenerTable;
