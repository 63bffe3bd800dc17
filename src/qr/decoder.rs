//! Декодер матрицы модулей QR и точки расширения для детектора.
//!
//! Пайплайн [`QrV1Decoder`]: формат-инфо (две копии) → снятие маски и чтение
//! 26 кодвордов → исправление RS → разбор потока данных.

use log::{debug, trace};

use super::bitstream::decode_bitstream;
use super::data::{read_codewords_v1, N1};
use super::format::{decode_format_word, FormatInfo, FORMAT_INFO_COORDS_V1};
use super::rs::rs_correct;
use crate::core::bits::BitMatrix;
use crate::core::types::{DecodeError, DecodeHints, DecodeResult, Point};

/// Что декодер матрицы отдаёт наверх.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecoderResult {
    pub text: String,
    /// Data-кодворды после исправления ошибок.
    pub raw_bytes: Vec<u8>,
    pub byte_segments: Vec<Vec<u8>>,
    pub ec_level: Option<String>,
}

/// Матрица модулей → текст.
pub trait MatrixDecoder {
    fn decode(&self, bits: &BitMatrix) -> DecodeResult<DecoderResult>;
}

/// Результат детектора: сетка модулей и точки-локаторы в пикселях.
#[derive(Clone, Debug)]
pub struct DetectorResult {
    pub bits: BitMatrix,
    pub points: Vec<Point>,
}

/// Поиск символа на произвольном (не «чистом») изображении.
pub trait Detector {
    fn detect(&self, image: &BitMatrix, hints: &DecodeHints) -> DecodeResult<DetectorResult>;
}

/// Декодер QR версии 1 (21×21).
#[derive(Clone, Copy, Debug, Default)]
pub struct QrV1Decoder;

impl QrV1Decoder {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

/// Прочитать обе копии формата и взять ближайшую к валидному слову.
fn read_format_info(bits: &BitMatrix) -> DecodeResult<FormatInfo> {
    FORMAT_INFO_COORDS_V1
        .iter()
        .map(|copy| {
            copy.iter()
                .fold(0u16, |acc, &(x, y)| (acc << 1) | u16::from(bits.get(x, y)))
        })
        .filter_map(|word| {
            let info = decode_format_word(word);
            trace!("qr: слово формата {word:#06x} → {info:?}");
            info
        })
        .min_by_key(|info| info.distance)
        .ok_or(DecodeError::Format)
}

impl MatrixDecoder for QrV1Decoder {
    fn decode(&self, bits: &BitMatrix) -> DecodeResult<DecoderResult> {
        if bits.width() != N1 || bits.height() != N1 {
            debug!("qr: сетка {}×{} — поддерживается только версия 1", bits.width(), bits.height());
            return Err(DecodeError::Format);
        }
        let format = read_format_info(bits)?;
        let (data_len, ec_len) = format.ec_level.v1_block();

        let mut codewords = read_codewords_v1(bits, format.mask_id);
        let corrected = rs_correct(&mut codewords, ec_len)?;
        debug!(
            "qr: уровень {}, маска {}, исправлено кодвордов: {corrected}",
            format.ec_level, format.mask_id
        );

        codewords.truncate(data_len);
        let content = decode_bitstream(&codewords)?;
        Ok(DecoderResult {
            text: content.text,
            raw_bytes: codewords,
            byte_segments: content.byte_segments,
            ec_level: Some(format.ec_level.to_string()),
        })
    }
}
