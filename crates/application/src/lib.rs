//! Application services and ports.
//!
//! The access policy ([`access_policy`], [`visibility`], [`action_gates`]) is
//! pure and synchronous. [`FieldService`] wires it to the REST API and the
//! session store.

#![forbid(unsafe_code)]

pub mod access_policy;
pub mod action_gates;
mod field_ports;
mod field_service;
pub mod visibility;

pub use access_policy::{effective_role, has_capability, resolve};
pub use action_gates::{
    can_delete_entity, can_manage_infractions, can_validate, capture_list_title,
};
pub use field_ports::{
    AuthenticatedSession, CaptureUpdate, FieldApiRepository, InfractionDecision, RecordPage,
    SessionStore,
};
pub use field_service::{BanditListing, DashboardSummary, FieldService};
pub use visibility::{filter_bandits, filter_captures, owned_capture_ids, validated_captures};
