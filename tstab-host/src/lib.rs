//! # tstab-host: Host Integration for tstab
//!
//! This crate provides the integration layer between the game-agnostic
//! `tstab-core` library and a host game's entity loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Host game loop              │
//! │  ┌───────────────────────────────────┐  │
//! │  │         tstab-host                │  │
//! │  │  ┌─────────────┐ ┌─────────────┐ │  │
//! │  │  │ Components  │ │   Systems   │ │  │
//! │  │  └──────┬──────┘ └──────┬──────┘ │  │
//! │  │         │   Hooks  Bridge│        │  │
//! │  │         ▼               ▼         │  │
//! │  │    ┌─────────────────────────┐    │  │
//! │  │    │       tstab-core        │    │  │
//! │  │    └─────────────────────────┘    │  │
//! │  └───────────────────────────────────┘  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `components`: per-entity stability state
//! - `systems`: the per-frame tick over all components
//! - `hooks`: trade and damage entry points
//! - `bridge`: stat sheet, class catalog and grid world collaborators
//! - `config`: host profiles, gates and logging setup

pub mod bridge;
pub mod components;
pub mod config;
pub mod hooks;
pub mod systems;
