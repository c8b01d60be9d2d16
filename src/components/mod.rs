//! UI components.

pub mod flow_diagram;
