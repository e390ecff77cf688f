pub mod status_compat;
