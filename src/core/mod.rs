//! # Core Chat Logic
//!
//! The chat client's business logic. It knows nothing about any specific
//! UI technology and performs no I/O.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • ChatState            │
//!                    │  • Action (events)      │
//!                    │  • Controller::update   │
//!                    │  • Effect (requests)    │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effects
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │                          │    NET     │
//!     │  Runtime   │ ───── executes ────────► │ channel +  │
//!     │ (ratatui)  │ ◄──── Actions ────────── │ REST API   │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`controller`]: the `Controller` trait, its two variants and the capability probe
//! - [`state`]: `ChatState`, everything a controller knows
//! - [`action`]: `Action` in, `Effect` out
//! - [`model`]: users, rooms, messages and the room registry
//! - [`format`]: message text fragments, timestamps, avatar colours
//! - [`typing`], [`unread`], [`scroll`]: small policies the controllers and renderer share
//! - [`config`]: layered configuration

pub mod action;
pub mod config;
pub mod controller;
pub mod format;
pub mod model;
pub mod scroll;
pub mod state;
pub mod typing;
pub mod unread;
