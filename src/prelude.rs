// src/prelude.rs
//
// Удобные re-export'ы: `use stripcode::prelude::*;`

pub use crate::api::{Pipeline, PipelineBuilder, Reader};
pub use crate::core::bits::{BitMatrix, BitRow};
pub use crate::core::types::{
    DecodeError, DecodeHints, DecodeResult, DecodedExtras, DecodedSymbol, GrayImage, LumaImage, Point, Symbology,
};
pub use crate::one_d::ItfReader;
pub use crate::qr::{EcLevel, QrReader};
