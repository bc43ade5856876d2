//! # Core Types
//!
//! This crate defines the fundamental types shared by the launcher host.
//!
//! ## Philosophy
//!
//! - **Identity is a value**: an application is named by what it is (name,
//!   source, version), never by the window that happens to show it.
//! - **Surfaces are handles**: a [`SurfaceId`] names one live presentation
//!   surface and nothing else.
//! - **Configuration is data**: startup configuration is parsed once and then
//!   read through plain accessors.
//!
//! ## Key Types
//!
//! - [`AppIdentity`]: unique key for an installable application
//! - [`SurfaceKey`]: what a surface hosts (the launcher or one application)
//! - [`SurfaceId`]: unique identifier for a presentation surface
//! - [`AppMetadata`]: display data cached for the lifetime of a surface
//! - [`CoreConfig`]: accessors over the parsed startup configuration

pub mod app;
pub mod config;
pub mod ids;

pub use app::{AppDescriptor, AppIdentity, AppMetadata, AppSource, SurfaceKey, OFFICIAL_SOURCE};
pub use config::{CoreConfig, StartupTarget};
pub use ids::SurfaceId;
