//! pipeset-lib: Core types and logic for pipeset
//!
//! This crate provides everything behind `pipeset set`:
//! - `vars`: variable sources merged by precedence
//! - `template`: `((name))` and deprecated `{{name}}` placeholder evaluation
//! - `resolve`: turning a raw document into its final text
//! - `config` / `diff`: parsed pipeline collections and their structural diff
//! - `store`: where configurations are persisted
//! - `apply`: the fetch, diff, confirm, save workflow

pub mod apply;
pub mod config;
pub mod consts;
pub mod diff;
pub mod platform;
pub mod resolve;
pub mod store;
pub mod template;
pub mod vars;
