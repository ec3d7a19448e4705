//! Select a connected set of vertices that contains every terminal, stays
//! within a cost budget and maximizes total utility.
//!
//! Connectivity is modelled with a single-commodity flow from a virtual
//! source (vertex 0) into one terminal, which makes the whole problem a
//! mixed-integer linear program solved through `good_lp`.

pub mod config;
pub mod domain;
pub mod io;
pub mod optimizer;
pub mod report;
pub mod selection;
pub mod telemetry;
