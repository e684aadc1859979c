//! Route handlers

pub mod diagnose;
pub mod form;
