//! A gift box hatches a robot buddy; keep it fed, entertained and tidy
//! until its battery runs out.
//!
//! The crate is the lifecycle and animation-orchestration core. Rendering,
//! asset decoding and the control panel sit behind [`scene::Scene`],
//! [`assets::AssetProvider`] and [`ui::Presenter`].

pub mod anim;
pub mod assets;
pub mod bus;
pub mod config;
pub mod ecs;
pub mod expression;
pub mod hatch;
pub mod pet;
pub mod scene;
pub mod ui;
pub mod util;
pub mod waste;
pub mod world;

#[cfg(test)]
mod testing;
