pub mod fpl_api;
