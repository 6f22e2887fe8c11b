pub mod charts;
pub mod data;
pub mod filters;
pub mod history;
pub mod names;
pub mod reconcile;
