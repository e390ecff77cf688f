pub mod cabinet;
pub mod cassette;
