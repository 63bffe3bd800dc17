//! Бинаризация 8-битной яркости в бинарные источники пикселей.
//!
//! - глобальный порог (смесь среднего и середины min/max) — быстро, без аллокаций;
//! - адаптивный порог по скользящему среднему — лучше на неравномерной засветке;
//! - целое изображение → [`BitMatrix`] (глобально или построчно-адаптивно).
//!
//! Соглашение: тёмный пиксель → бит установлен (чёрный).

use crate::core::bits::{BitMatrix, BitRow};
use crate::core::types::GrayImage;

/// Простой глобальный порог: смесь среднего и середины между min/max.
/// Не любит градиенты освещения.
#[inline]
pub fn otsu_like_threshold(pixels: &[u8]) -> u8 {
    if pixels.is_empty() {
        return 128;
    }
    let (mut min_v, mut max_v) = (u8::MAX, 0u8);
    let mut sum: u64 = 0;
    for &v in pixels {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
        sum += u64::from(v);
    }
    let mean = (sum / pixels.len() as u64) as u16;
    let mid = (u16::from(min_v) + u16::from(max_v)) / 2;
    ((mean + mid) / 2) as u8
}

/// Глобальная бинаризация строки.
pub fn binarize_row(row: &[u8]) -> BitRow {
    let t = otsu_like_threshold(row);
    let mut out = BitRow::new(row.len());
    for (i, _) in row.iter().enumerate().filter(|&(_, &v)| v < t) {
        out.set(i);
    }
    out
}

/// Адаптивная бинаризация по скользящему среднему окна `win` с небольшим смещением.
/// Окно: width/32, в диапазоне [8..64].
pub fn binarize_row_adaptive(row: &[u8]) -> BitRow {
    let n = row.len();
    let mut out = BitRow::new(n);
    if n == 0 {
        return out;
    }
    let win = (n / 32).clamp(8, 64);
    let bias: i32 = 5; // небольшой «запас» в сторону белого

    // префиксные суммы для среднего по окну
    let mut pref: Vec<u32> = Vec::with_capacity(n + 1);
    pref.push(0);
    let mut acc = 0u32;
    for &v in row {
        acc += u32::from(v);
        pref.push(acc);
    }

    for (i, &v) in row.iter().enumerate() {
        let left = i.saturating_sub(win);
        let right = (i + win).min(n - 1);
        let len = (right - left + 1) as u32;
        let mean = ((pref[right + 1] - pref[left]) / len) as i32;
        if i32::from(v) < mean - bias {
            out.set(i);
        }
    }
    out
}

/// Всё изображение одним глобальным порогом.
pub fn binarize_image(img: &GrayImage<'_>) -> BitMatrix {
    let t = otsu_like_threshold(img.data);
    let mut out = BitMatrix::new(img.width, img.height);
    for y in 0..img.height {
        for (x, _) in img.row(y).iter().enumerate().filter(|&(_, &v)| v < t) {
            out.set(x, y);
        }
    }
    out
}

/// Изображение построчно, адаптивным порогом.
pub fn binarize_image_adaptive(img: &GrayImage<'_>) -> BitMatrix {
    let mut out = BitMatrix::new(img.width, img.height);
    for y in 0..img.height {
        let row = binarize_row_adaptive(img.row(y));
        for x in row.iter().enumerate().filter_map(|(x, b)| b.then_some(x)) {
            out.set(x, y);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_threshold_splits_black_and_white() {
        let row = [255u8, 250, 10, 0, 240, 5];
        let bits = binarize_row(&row);
        let got: Vec<bool> = bits.iter().collect();
        assert_eq!(got, vec![false, false, true, true, false, true]);
    }

    #[test]
    fn adaptive_survives_gradient() {
        // светлый фон с линейным градиентом и узкими тёмными полосами
        let row: Vec<u8> = (0..256usize)
            .map(|i| {
                let base = 120 + (i / 2) as u8;
                if (i / 8) % 4 == 0 { base - 100 } else { base }
            })
            .collect();
        let bits = binarize_row_adaptive(&row);
        assert!(bits.get(2));
        assert!(!bits.get(12));
        assert!(bits.get(226));
        assert!(!bits.get(236));
    }

    #[test]
    fn image_binarization_keeps_geometry() {
        let data = vec![255u8, 0, 255, 0, 255, 255];
        let img = GrayImage { data: &data, width: 3, height: 2 };
        let m = binarize_image(&img);
        assert_eq!((m.width(), m.height()), (3, 2));
        assert!(m.get(1, 0) && m.get(0, 1));
        assert!(!m.get(0, 0) && !m.get(2, 1));
        assert_eq!(binarize_image_adaptive(&img).width(), 3);
    }
}
