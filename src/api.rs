// src/api.rs
//
// Верхнеуровневый API: трейт `Reader` (одна симвология) и `Pipeline`,
// который бинаризует картинку и прогоняет её через подключённые ридеры.

use log::{debug, trace};

use crate::binarize::{binarize_image, binarize_image_adaptive};
use crate::core::bits::BitMatrix;
use crate::one_d::ItfReader;
use crate::prelude::*;
use crate::qr::QrReader;

/// Ридер одной символогии поверх бинарного изображения.
pub trait Reader {
    fn symbology(&self) -> Symbology;
    fn decode(&self, image: &BitMatrix, hints: &DecodeHints) -> DecodeResult<DecodedSymbol>;
}

pub struct Pipeline {
    readers: Vec<Box<dyn Reader + Send + Sync>>,
    hints: DecodeHints,
    adaptive: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        PipelineBuilder::new().build()
    }
}

impl Pipeline {
    /// Пайплайн со всеми ридерами и подсказками по умолчанию.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    #[inline]
    pub fn hints(&self) -> &DecodeHints {
        &self.hints
    }

    /// Первый успешный ридер. Если не справился никто — самая содержательная
    /// из ошибок (Checksum > Format > NotFound).
    pub fn decode_bits(&self, image: &BitMatrix) -> DecodeResult<DecodedSymbol> {
        let mut worst = DecodeError::NotFound;
        for reader in &self.readers {
            match reader.decode(image, &self.hints) {
                Ok(sym) => {
                    debug!("pipeline: {:?} → {:?}", reader.symbology(), sym.text);
                    return Ok(sym);
                }
                Err(e) => {
                    trace!("pipeline: {:?} не прочитал: {e}", reader.symbology());
                    if e.rank() > worst.rank() {
                        worst = e;
                    }
                }
            }
        }
        Err(worst)
    }
}

/// Пустая картинка или буфер короче `width × height` — читать нечего.
fn is_unreadable(img: &LumaImage) -> bool {
    img.width == 0
        || img.height == 0
        || img.width.checked_mul(img.height).map_or(true, |n| img.data.len() < n)
}

impl Pipeline {
    fn binarize(&self, img: &LumaImage) -> BitMatrix {
        if self.adaptive {
            binarize_image_adaptive(&img.as_gray())
        } else {
            binarize_image(&img.as_gray())
        }
    }

    /// «Распознай всё»: каждый ридер даёт не больше одного символа.
    pub fn decode_all(&self, img: &LumaImage) -> Vec<DecodedSymbol> {
        if is_unreadable(img) {
            debug!("pipeline: картинка {}×{} при буфере {} байт", img.width, img.height, img.data.len());
            return Vec::new();
        }
        let bits = self.binarize(img);
        self.readers
            .iter()
            .filter_map(|reader| reader.decode(&bits, &self.hints).ok())
            .collect()
    }

    /// «Распознай первый» — удобный сахар.
    pub fn decode_first(&self, img: &LumaImage) -> DecodeResult<DecodedSymbol> {
        if is_unreadable(img) {
            return Err(DecodeError::NotFound);
        }
        self.decode_bits(&self.binarize(img))
    }
}

/// Сборка пайплайна: какие ридеры, какие подсказки, какая бинаризация.
pub struct PipelineBuilder {
    itf: bool,
    qr: Option<QrReader>,
    extra: Vec<Box<dyn Reader + Send + Sync>>,
    hints: DecodeHints,
    adaptive: bool,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    /// По умолчанию включены ITF и QR, бинаризация глобальная.
    pub fn new() -> Self {
        Self {
            itf: true,
            qr: Some(QrReader::new()),
            extra: Vec::new(),
            hints: DecodeHints::default(),
            adaptive: false,
        }
    }

    #[inline]
    pub fn enable_itf(mut self, on: bool) -> Self {
        self.itf = on;
        self
    }

    #[inline]
    pub fn enable_qr(mut self, on: bool) -> Self {
        self.qr = on.then(QrReader::new);
        self
    }

    /// Свой QR-ридер (например, с детектором).
    #[inline]
    pub fn qr_reader(mut self, reader: QrReader) -> Self {
        self.qr = Some(reader);
        self
    }

    /// Дополнительный ридер в конец списка.
    #[inline]
    pub fn reader(mut self, reader: impl Reader + Send + Sync + 'static) -> Self {
        self.extra.push(Box::new(reader));
        self
    }

    #[inline]
    pub fn hints(mut self, hints: DecodeHints) -> Self {
        self.hints = hints;
        self
    }

    #[inline]
    pub fn adaptive_binarization(mut self, on: bool) -> Self {
        self.adaptive = on;
        self
    }

    pub fn build(self) -> Pipeline {
        let mut readers: Vec<Box<dyn Reader + Send + Sync>> = Vec::new();
        if self.itf {
            readers.push(Box::new(ItfReader::new()));
        }
        if let Some(qr) = self.qr {
            readers.push(Box::new(qr));
        }
        readers.extend(self.extra);
        Pipeline {
            readers,
            hints: self.hints,
            adaptive: self.adaptive,
        }
    }
}
