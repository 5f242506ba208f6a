//! Default value functions for configuration.
//!
//! Each function is used as a `#[serde(default = "crate::defaults::...")]`
//! attribute on a `Config` field so partial config files load cleanly.

pub fn animation_duration() -> f64 {
    0.2 // Seconds for the slide in/out animation
}

pub fn background_opacity() -> f64 {
    1.0 // Fully opaque by default
}

pub fn background_blur() -> u32 {
    0 // No blur
}

pub fn auto_hide_suppression_ms() -> u64 {
    250 // Focus churn window ignored after internal tab moves
}

pub fn bool_true() -> bool {
    true
}
