//! World-model protocols.
//!
//! Two sub-protocols share the framing and the `data_response` shape but
//! have disjoint tag spaces: [`client`] is spoken between application
//! clients and the world model, [`solver`] between solvers and the world
//! model.

pub mod client;
pub mod solver;
