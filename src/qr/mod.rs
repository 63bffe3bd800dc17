//! QR: чтение матричного символа.
//!
//! Два пути к сетке модулей:
//! - «чистый» символ (`DecodeHints::pure_barcode`) — [`pure::extract_pure_bits`];
//! - иначе — подключаемый [`Detector`]; без детектора такой вход не читается.
//!
//! Дальше сетка уходит в [`MatrixDecoder`] (по умолчанию [`QrV1Decoder`]).

pub mod bitstream;
pub mod data;
pub mod decoder;
pub mod encode;
pub mod format;
pub mod pure;
pub mod rs;

use log::debug;

use crate::api::Reader;
use crate::core::bits::BitMatrix;
use crate::core::types::{DecodeError, DecodeHints, DecodeResult, DecodedExtras, DecodedSymbol, Point, Symbology};

pub use decoder::{Detector, DetectorResult, DecoderResult, MatrixDecoder, QrV1Decoder};
pub use encode::{render_luma, render_modules, synthesize_qr_v1};
pub use format::EcLevel;
pub use pure::extract_pure_bits;

/// Ридер QR поверх декодера матрицы `D`.
pub struct QrReader<D: MatrixDecoder = QrV1Decoder> {
    decoder: D,
    detector: Option<Box<dyn Detector + Send + Sync>>,
}

impl Default for QrReader {
    fn default() -> Self {
        Self::new()
    }
}

impl QrReader {
    #[inline]
    pub fn new() -> Self {
        Self::with_decoder(QrV1Decoder)
    }
}

impl<D: MatrixDecoder> QrReader<D> {
    #[inline]
    pub fn with_decoder(decoder: D) -> Self {
        Self { decoder, detector: None }
    }

    /// Подключить детектор для не-«чистых» изображений.
    #[inline]
    pub fn with_detector(mut self, detector: impl Detector + Send + Sync + 'static) -> Self {
        self.detector = Some(Box::new(detector));
        self
    }

    /// Найти сетку и декодировать её.
    pub fn decode_matrix(&self, image: &BitMatrix, hints: &DecodeHints) -> DecodeResult<DecodedSymbol> {
        let (bits, points) = if hints.pure_barcode {
            (extract_pure_bits(image)?, Vec::new())
        } else if let Some(detector) = &self.detector {
            let found = detector.detect(image, hints)?;
            (found.bits, found.points)
        } else {
            debug!("qr: детектор не подключён, а изображение не помечено как чистое");
            return Err(DecodeError::NotFound);
        };

        let res = self.decoder.decode(&bits)?;
        Ok(into_symbol(res, points))
    }
}

fn into_symbol(res: DecoderResult, points: Vec<Point>) -> DecodedSymbol {
    let mut extras = DecodedExtras::new();
    extras.ec_level = res.ec_level;
    extras.byte_segments = res.byte_segments;
    DecodedSymbol::new(Symbology::QrCode, res.text)
        .with_bytes(res.raw_bytes)
        .with_points(points)
        .with_extras(extras)
}

impl<D: MatrixDecoder> Reader for QrReader<D> {
    fn symbology(&self) -> Symbology {
        Symbology::QrCode
    }

    fn decode(&self, image: &BitMatrix, hints: &DecodeHints) -> DecodeResult<DecodedSymbol> {
        self.decode_matrix(image, hints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pure_hints() -> DecodeHints {
        DecodeHints::new().with_pure_barcode(true)
    }

    #[test]
    fn pure_symbol_end_to_end() {
        let modules = synthesize_qr_v1("HELLO", EcLevel::L, 3).unwrap();
        let img = render_modules(&modules, 4, 4);
        let sym = QrReader::new().decode_matrix(&img, &pure_hints()).unwrap();
        assert_eq!(sym.symbology, Symbology::QrCode);
        assert_eq!(sym.text, "HELLO");
        assert!(sym.points.is_empty());
        assert_eq!(sym.extras.ec_level.as_deref(), Some("L"));
        assert_eq!(sym.extras.byte_segments, vec![b"HELLO".to_vec()]);
        assert_eq!(sym.bytes.as_ref().map(Vec::len), Some(19));
    }

    #[test]
    fn non_pure_without_detector_is_not_found() {
        let modules = synthesize_qr_v1("HELLO", EcLevel::L, 3).unwrap();
        let img = render_modules(&modules, 4, 4);
        assert_eq!(QrReader::new().decode_matrix(&img, &DecodeHints::new()), Err(DecodeError::NotFound));
    }

    /// Детектор-заглушка: уже знает сетку и углы.
    struct Fixed(BitMatrix);

    impl Detector for Fixed {
        fn detect(&self, _image: &BitMatrix, _hints: &DecodeHints) -> DecodeResult<DetectorResult> {
            Ok(DetectorResult {
                bits: self.0.clone(),
                points: vec![Point::new(3.5, 17.5), Point::new(3.5, 3.5), Point::new(17.5, 3.5)],
            })
        }
    }

    #[test]
    fn detector_path_carries_points() {
        let modules = synthesize_qr_v1("via detector", EcLevel::M, 0).unwrap();
        let reader = QrReader::new().with_detector(Fixed(modules));
        let sym = reader.decode_matrix(&BitMatrix::new(1, 1), &DecodeHints::new()).unwrap();
        assert_eq!(sym.text, "via detector");
        assert_eq!(sym.points.len(), 3);
    }

    /// Декодер, который всегда падает: ошибка должна дойти до вызывающего как есть.
    struct Failing;

    impl MatrixDecoder for Failing {
        fn decode(&self, _bits: &BitMatrix) -> DecodeResult<DecoderResult> {
            Err(DecodeError::Checksum)
        }
    }

    #[test]
    fn decoder_errors_propagate() {
        let modules = synthesize_qr_v1("x", EcLevel::H, 7).unwrap();
        let img = render_modules(&modules, 2, 1);
        let reader = QrReader::with_decoder(Failing);
        assert_eq!(reader.decode_matrix(&img, &pure_hints()), Err(DecodeError::Checksum));
        assert_eq!(reader.symbology(), Symbology::QrCode);
    }
}
