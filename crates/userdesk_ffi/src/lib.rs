//! Flutter-facing bridge for the user screen core.

pub mod api;
