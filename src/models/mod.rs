//! Data models for the OpenStack gateway.

pub mod auth;
pub mod catalog;
