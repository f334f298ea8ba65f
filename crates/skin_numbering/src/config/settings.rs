//! User-facing numbering settings
//!
//! The host application owns how these are stored and edited; the library
//! only reads them.

/// Settings that decide where vehicle numbers come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingSettings {
    /// Derive numbers from the vehicle identifier instead of the random sequence
    pub prefer_car_id: bool,
    /// Let schemes add their `offset` to derived and random numbers
    pub allow_car_id_offset: bool,
    /// Register the built-in default schemes alongside skin schemes
    pub enable_default_numbers: bool,
}

impl Default for NumberingSettings {
    fn default() -> Self {
        Self {
            prefer_car_id: true,
            allow_car_id_offset: true,
            enable_default_numbers: true,
        }
    }
}
