//! Общие типы и контейнеры бит.

pub mod bits;
pub mod pgm;
pub mod types;
