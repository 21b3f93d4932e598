// Domain layer - Pure equipment, mode, and timing models
pub mod equipment;
pub mod mode;
pub mod skew;
pub mod valve;
