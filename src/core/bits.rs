// src/core/bits.rs
//
// Бинарные источники пикселей: строка бит (BitRow) и матрица бит (BitMatrix).
// true = «чёрный» (передний план), false = «белый» (фон).
// Хранение — словами u32, младший бит слова соответствует меньшему индексу.

use std::ops::Deref;

const WORD_BITS: usize = 32;

#[inline]
fn words_for(bits: usize) -> usize {
    bits.div_ceil(WORD_BITS)
}

/// Строка бинарных пикселей фиксированной длины.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitRow {
    words: Vec<u32>,
    size: usize,
}

impl BitRow {
    /// Пустая (вся белая) строка длины `size`.
    pub fn new(size: usize) -> Self {
        Self {
            words: vec![0; words_for(size)],
            size,
        }
    }

    /// Собрать строку из булевых пикселей (true = чёрный).
    pub fn from_bools(pixels: &[bool]) -> Self {
        let mut row = Self::new(pixels.len());
        for (i, &black) in pixels.iter().enumerate() {
            if black {
                row.set(i);
            }
        }
        row
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        debug_assert!(i < self.size);
        (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 != 0
    }

    #[inline]
    pub fn set(&mut self, i: usize) {
        debug_assert!(i < self.size);
        self.words[i / WORD_BITS] |= 1 << (i % WORD_BITS);
    }

    /// Индекс первого чёрного пикселя, начиная с `from`; `len()`, если таких нет.
    pub fn get_next_set(&self, from: usize) -> usize {
        if from >= self.size {
            return self.size;
        }
        let mut w = from / WORD_BITS;
        // отрезаем биты слева от `from`
        let mut current = self.words[w] & !((1u32 << (from % WORD_BITS)) - 1);
        while current == 0 {
            w += 1;
            if w == self.words.len() {
                return self.size;
            }
            current = self.words[w];
        }
        (w * WORD_BITS + current.trailing_zeros() as usize).min(self.size)
    }

    /// Развернуть строку на месте (читать справа налево).
    fn reverse(&mut self) {
        let mut out = vec![0u32; self.words.len()];
        for i in (0..self.size).filter(|&i| self.get(i)) {
            let j = self.size - 1 - i;
            out[j / WORD_BITS] |= 1 << (j % WORD_BITS);
        }
        self.words = out;
    }

    /// Временный разворот строки. Исходная ориентация восстанавливается,
    /// когда guard выходит из области видимости — на любом пути выхода,
    /// включая ранний возврат ошибки через `?`.
    pub fn reversed(&mut self) -> Reversed<'_> {
        self.reverse();
        Reversed { row: self }
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.size).map(move |i| self.get(i))
    }
}

/// Guard развёрнутой строки, см. [`BitRow::reversed`].
#[derive(Debug)]
pub struct Reversed<'a> {
    row: &'a mut BitRow,
}

impl Deref for Reversed<'_> {
    type Target = BitRow;

    fn deref(&self) -> &BitRow {
        self.row
    }
}

impl Drop for Reversed<'_> {
    fn drop(&mut self) {
        self.row.reverse();
    }
}

/// Двумерная матрица бит.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    row_words: usize,
    words: Vec<u32>,
}

impl BitMatrix {
    pub fn new(width: usize, height: usize) -> Self {
        let row_words = words_for(width);
        Self {
            width,
            height,
            row_words,
            words: vec![0; row_words * height],
        }
    }

    /// Квадратная матрица `dimension × dimension`.
    #[inline]
    pub fn square(dimension: usize) -> Self {
        Self::new(dimension, dimension)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.width && y < self.height);
        (self.words[y * self.row_words + x / WORD_BITS] >> (x % WORD_BITS)) & 1 != 0
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize) {
        debug_assert!(x < self.width && y < self.height);
        self.words[y * self.row_words + x / WORD_BITS] |= 1 << (x % WORD_BITS);
    }

    #[inline]
    pub fn flip(&mut self, x: usize, y: usize) {
        debug_assert!(x < self.width && y < self.height);
        self.words[y * self.row_words + x / WORD_BITS] ^= 1 << (x % WORD_BITS);
    }

    /// Скопировать строку `y` в отдельный [`BitRow`].
    pub fn row(&self, y: usize) -> BitRow {
        let start = y * self.row_words;
        BitRow {
            words: self.words[start..start + self.row_words].to_vec(),
            size: self.width,
        }
    }

    /// Первый чёрный пиксель в порядке чтения (слева направо, сверху вниз).
    pub fn top_left_on_bit(&self) -> Option<(usize, usize)> {
        let idx = self.words.iter().position(|&w| w != 0)?;
        let y = idx / self.row_words;
        let x = (idx % self.row_words) * WORD_BITS + self.words[idx].trailing_zeros() as usize;
        Some((x, y))
    }

    /// Последний чёрный пиксель в порядке чтения.
    pub fn bottom_right_on_bit(&self) -> Option<(usize, usize)> {
        let idx = self.words.iter().rposition(|&w| w != 0)?;
        let y = idx / self.row_words;
        let x = (idx % self.row_words) * WORD_BITS + (WORD_BITS - 1)
            - self.words[idx].leading_zeros() as usize;
        Some((x, y))
    }
}
