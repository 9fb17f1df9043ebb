pub mod ports;
pub mod normalize_use_case;
