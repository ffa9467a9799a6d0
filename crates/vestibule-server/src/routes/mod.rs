//! HTTP route modules.
//!
//! `pages` renders the portal shells, `auth` manages the presence-only
//! credentials, `admin` exposes the bypass-guarded maintenance toggle, and
//! `status` serves this shell's maintenance view in the platform wire shape.

pub mod admin;
pub mod auth;
pub mod pages;
pub mod status;
