#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]

// Публичные модули
pub mod api;      // высокий уровень: пайплайн, трейт Reader
pub mod core;     // общие типы, битовые контейнеры, PGM
pub mod prelude;  // удобные re-export'ы

pub mod one_d;    // 1D: run-length примитивы и ITF
pub mod qr;       // QR: чистый символ, формат, RS, поток данных
pub mod binarize; // бинаризация яркости

// Реэкспорт базовых типов в корень
pub use crate::core::types::{DecodeError, DecodeHints, DecodeResult, DecodedSymbol, GrayImage, LumaImage, Symbology};

// Синтетика для демо-бинарников
pub use crate::one_d::itf::synthesize_itf_row;
pub use crate::qr::synthesize_qr_v1;

use crate::api::Pipeline;

/// Универсальный one-shot: прогоняет изображение через ридеры пайплайна.
#[inline]
pub fn decode_all(img: &LumaImage, pipeline: &Pipeline) -> Vec<DecodedSymbol> {
    pipeline.decode_all(img)
}

/// Упроститель: первый прочитанный символ или самая содержательная ошибка.
#[inline]
pub fn decode_first(img: &LumaImage, pipeline: &Pipeline) -> DecodeResult<DecodedSymbol> {
    pipeline.decode_first(img)
}
