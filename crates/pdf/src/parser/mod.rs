pub mod backend;
pub mod fragments;
