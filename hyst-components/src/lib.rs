//! Drivers built on `hyst-core` hysteresis models.

mod electromagnet;

pub use electromagnet::Electromagnet;
