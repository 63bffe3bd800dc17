// src/core/types.rs
//
// Общие типы, независимые от конкретных декодеров: изображения, результат,
// ошибки, подсказки декодирования.

use std::collections::BTreeMap;

use thiserror::Error;

/// Простое представление градаций серого.
/// Буфер `data` — построчно (row-major), 8 бит на пиксель.
#[derive(Clone, Copy, Debug)]
pub struct GrayImage<'a> {
    pub data: &'a [u8],
    pub width: usize,
    pub height: usize,
}

impl<'a> GrayImage<'a> {
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }
}

/// LumaImage — «владельческая» картинка, удобная для пайплайна.
#[derive(Clone, Debug)]
pub struct LumaImage {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl LumaImage {
    #[inline]
    pub fn as_gray(&self) -> GrayImage<'_> {
        GrayImage {
            data: &self.data,
            width: self.width,
            height: self.height,
        }
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }
}

/// Позволяем делать `.into()` из GrayImage в LumaImage (копия буфера).
impl<'a> From<GrayImage<'a>> for LumaImage {
    #[inline]
    fn from(g: GrayImage<'a>) -> Self {
        Self {
            data: g.data.to_vec(),
            width: g.width,
            height: g.height,
        }
    }
}

/// Точка-локатор символа (в пикселях исходного изображения).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Тип распознанного символа.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Symbology {
    /// Interleaved 2 of 5.
    Itf,
    QrCode,
}

/// Ошибки распознавания. Все три — «попробуй другую символогию / следующий кадр».
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum DecodeError {
    /// Не найден структурный элемент: guard, угол finder'а, тихая зона,
    /// полная группа run'ов.
    #[error("символ не найден")]
    NotFound,
    /// Символ найден и прочитан, но нарушает правила формата
    /// (длина строки, размер матрицы, режим потока).
    #[error("неверный формат символа")]
    Format,
    /// Данные разобраны, но контроль целостности (Рида–Соломона) не сошёлся.
    #[error("ошибка контрольной суммы")]
    Checksum,
}

impl DecodeError {
    /// Насколько ошибка «конкретна»: при переборе символогий наружу отдаём
    /// самую содержательную.
    #[inline]
    pub(crate) fn rank(self) -> u8 {
        match self {
            DecodeError::NotFound => 0,
            DecodeError::Format => 1,
            DecodeError::Checksum => 2,
        }
    }
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// Подсказки декодирования.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeHints {
    /// Разрешённые длины строки ITF; `None` — набор по умолчанию.
    pub allowed_lengths: Option<Vec<usize>>,
    /// Изображение — уже выровненный и обрезанный матричный символ.
    pub pure_barcode: bool,
    /// Сколько строк сканировать (равномерно по высоте) для 1D.
    pub scan_rows: usize,
}

impl Default for DecodeHints {
    fn default() -> Self {
        Self {
            allowed_lengths: None,
            pure_barcode: false,
            scan_rows: 15,
        }
    }
}

impl DecodeHints {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_allowed_lengths(mut self, lengths: impl Into<Vec<usize>>) -> Self {
        self.allowed_lengths = Some(lengths.into());
        self
    }

    #[inline]
    pub fn with_pure_barcode(mut self, pure: bool) -> Self {
        self.pure_barcode = pure;
        self
    }

    #[inline]
    pub fn with_scan_rows(mut self, rows: usize) -> Self {
        self.scan_rows = rows;
        self
    }
}

/// Дополнительная мета-информация о распознавании.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedExtras {
    /// Уровень коррекции ошибок матричного символа ("L", "M", "Q", "H").
    pub ec_level: Option<String>,
    /// Сегменты Byte mode в порядке следования.
    pub byte_segments: Vec<Vec<u8>>,
    pub properties: BTreeMap<String, String>,
}

impl DecodedExtras {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecodedSymbol {
    pub symbology: Symbology,
    pub text: String,
    pub bytes: Option<Vec<u8>>,
    pub points: Vec<Point>,
    pub extras: DecodedExtras,
}

impl DecodedSymbol {
    #[inline]
    pub fn new(symbology: Symbology, text: impl Into<String>) -> Self {
        Self {
            symbology,
            text: text.into(),
            bytes: None,
            points: Vec::new(),
            extras: DecodedExtras::new(),
        }
    }

    #[inline]
    pub fn with_bytes(mut self, b: Vec<u8>) -> Self {
        self.bytes = Some(b);
        self
    }
    #[inline]
    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        self.points = points;
        self
    }
    #[inline]
    pub fn with_extras(mut self, extras: DecodedExtras) -> Self {
        self.extras = extras;
        self
    }
}
