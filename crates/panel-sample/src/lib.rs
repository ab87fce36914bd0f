//! # Panel Sample
//!
//! A small application built on `panel_framework`.
//!
//! - **[scene_tree]**: an in-memory engine (prefab catalog, loader, node tree).
//! - **[panels]**: three panels covering both panel kinds: [`LoadingPanel`](panels::LoadingPanel)
//!   (`new`), [`SettingsPanel`](panels::SettingsPanel) (`old`) and
//!   [`ConfirmDialog`](panels::ConfirmDialog) (`new`, stacked above the others).
//! - **[lifecycle]**: [`UiSystem`](lifecycle::UiSystem), which wires them together.

pub mod lifecycle;
pub mod panels;
pub mod scene_tree;
