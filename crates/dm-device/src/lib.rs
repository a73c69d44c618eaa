//! `dm-device` — Structure-of-Arrays device storage for the disaster-mobility
//! simulation framework.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-------------------------------------------------------------|
//! | [`component`]   | `ComponentVec` trait, `TypedComponentVec<T>`, `ComponentMap` |
//! | [`store`]       | `DeviceStore` (SoA arrays), `DeviceRngs` (per-device RNG) |
//! | [`builder`]     | `DeviceStoreBuilder` (fluent construction)                |
//!
//! Unlike the framework this crate is descended from, `DeviceStore`'s fields
//! (`current_node`, `target_node`, `lon`, `lat`, `accuracy`) are always on —
//! they are the core per-tick state this spec defines, not an optional
//! extension, so there is no feature-gating equivalent of the teacher's
//! `spatial`/`schedule`/`mobility` flags here. `ComponentMap` remains the
//! escape hatch for anything application-defined.

pub mod builder;
pub mod component;
pub mod store;


pub use builder::DeviceStoreBuilder;
pub use component::{ComponentMap, ComponentVec, TypedComponentVec};
pub use store::{DeviceRngs, DeviceStore};
