//! 1D: общие примитивы (run-lengths, сравнение с эталоном) и сканирование строк.
//!
//! Сравнение ширин — в фиксированной точке со сдвигом 8 (×256), без float
//! в горячем цикле. Результат [`pattern_match_variance`] — средняя
//! «дисперсия» на пиксель, масштаб ×256; меньше — лучше.

pub mod itf;

use log::{debug, trace};

use crate::core::bits::{BitMatrix, BitRow};
use crate::core::types::{DecodeError, DecodeHints, DecodeResult, DecodedSymbol};

pub use itf::ItfReader;

/// Сдвиг фиксированной точки: 1.0 == 1 << 8.
const INTEGER_MATH_SHIFT: u32 = 8;

/// Записать `counters.len()` подряд идущих run'ов, начиная с `start`.
///
/// Цвет первого run'а — цвет пикселя `row[start]`. Последний run может
/// упираться в конец строки; если строка закончилась раньше — `NotFound`.
pub fn record_pattern(row: &BitRow, start: usize, counters: &mut [u32]) -> DecodeResult<()> {
    counters.fill(0);
    let end = row.len();
    if start >= end || counters.is_empty() {
        return Err(DecodeError::NotFound);
    }
    let num_counters = counters.len();
    let mut is_white = !row.get(start);
    let mut position = 0usize;
    let mut i = start;
    while i < end {
        if row.get(i) != is_white {
            counters[position] += 1;
        } else {
            position += 1;
            if position == num_counters {
                break;
            }
            counters[position] = 1;
            is_white = !is_white;
        }
        i += 1;
    }
    // последний run вправе закончиться ровно на краю строки
    if position == num_counters || (position == num_counters - 1 && i == end) {
        Ok(())
    } else {
        Err(DecodeError::NotFound)
    }
}

/// Насколько наблюдаемые run'ы `counters` похожи на эталон `pattern`.
///
/// `max_individual_variance` — допуск на один бар (×256 от ширины модуля).
/// Если хоть один бар выходит за допуск, возвращается `u32::MAX`; иначе —
/// средняя дисперсия (×256). Отрицательных значений не бывает.
pub fn pattern_match_variance(counters: &[u32], pattern: &[u32], max_individual_variance: u32) -> u32 {
    debug_assert_eq!(counters.len(), pattern.len());
    let total: u32 = counters.iter().sum();
    let pattern_length: u32 = pattern.iter().sum();
    if total < pattern_length || pattern_length == 0 {
        // меньше пикселя на модуль — сравнивать бессмысленно
        return u32::MAX;
    }
    let unit_bar_width = (total << INTEGER_MATH_SHIFT) / pattern_length;
    let max_individual = (max_individual_variance * unit_bar_width) >> INTEGER_MATH_SHIFT;

    let mut total_variance = 0u32;
    for (&counter, &expected) in counters.iter().zip(pattern) {
        let scaled_counter = counter << INTEGER_MATH_SHIFT;
        let scaled_pattern = expected * unit_bar_width;
        let variance = scaled_counter.abs_diff(scaled_pattern);
        if variance > max_individual {
            return u32::MAX;
        }
        total_variance += variance;
    }
    total_variance / total
}

/// Номера строк для сканирования: `rows` штук равномерно по высоте.
fn scan_lines(height: usize, rows: usize) -> impl Iterator<Item = usize> {
    let rows = rows.max(1).min(height);
    (0..rows).map(move |i| (i * (height - 1)) / (rows - 1).max(1))
}

/// Прогнать ITF-декодер по нескольким строкам матрицы, вернуть первый успех.
///
/// Если ни одна строка не подошла — наружу уходит самая содержательная
/// из встреченных ошибок.
pub fn decode_rows(reader: &ItfReader, image: &BitMatrix, hints: &DecodeHints) -> DecodeResult<DecodedSymbol> {
    let mut worst = DecodeError::NotFound;
    for y in scan_lines(image.height(), hints.scan_rows) {
        let mut row = image.row(y);
        match reader.decode_row(y, &mut row, hints) {
            Ok(symbol) => {
                debug!("itf: строка {y} → {}", symbol.text);
                return Ok(symbol);
            }
            Err(e) => {
                trace!("itf: строка {y}: {e}");
                if e.rank() > worst.rank() {
                    worst = e;
                }
            }
        }
    }
    Err(worst)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_of(pattern: &str) -> BitRow {
        let px: Vec<bool> = pattern.bytes().map(|c| c == b'1').collect();
        BitRow::from_bools(&px)
    }

    #[test]
    fn record_pattern_counts_alternating_runs() {
        let row = row_of("0011100001");
        let mut counters = [0u32; 3];
        record_pattern(&row, 2, &mut counters).unwrap();
        assert_eq!(counters, [3, 4, 1]);
    }

    #[test]
    fn record_pattern_starts_with_actual_colour() {
        let row = row_of("0011100001");
        let mut counters = [0u32; 2];
        record_pattern(&row, 0, &mut counters).unwrap();
        assert_eq!(counters, [2, 3]);
    }

    #[test]
    fn record_pattern_fails_when_row_runs_out() {
        let row = row_of("0011100001");
        let mut counters = [0u32; 4];
        assert_eq!(record_pattern(&row, 2, &mut counters), Err(DecodeError::NotFound));
        assert_eq!(record_pattern(&row, 10, &mut counters), Err(DecodeError::NotFound));
    }

    #[test]
    fn exact_match_has_zero_variance_at_any_scale() {
        let pattern = [1u32, 1, 3, 3, 1];
        for k in 1..6 {
            let counters: Vec<u32> = pattern.iter().map(|p| p * k).collect();
            assert_eq!(pattern_match_variance(&counters, &pattern, 204), 0);
        }
    }

    #[test]
    fn average_threshold_is_separate_from_individual_cutoff() {
        // каждый бар в пределах 0.8 модуля, но в среднем — 0.5 модуля
        let counters = [2u32, 6, 2, 6];
        let v = pattern_match_variance(&counters, &[1, 1, 1, 1], 204);
        assert!(v < u32::MAX);
        assert!(v >= 107, "average variance {v}");
    }

    #[test]
    fn one_bad_bar_is_rejected_outright() {
        let counters = [1u32, 1, 1, 5];
        assert_eq!(pattern_match_variance(&counters, &[1, 1, 1, 1], 204), u32::MAX);
    }

    #[test]
    fn bar_over_limit_rejected_even_with_low_average() {
        // среднее 104 < 107, но последний бар вылезает за 204
        let counters = [20u32, 20, 20, 50];
        assert_eq!(pattern_match_variance(&counters, &[1, 1, 1, 1], 204), u32::MAX);
        assert_eq!(pattern_match_variance(&counters, &[1, 1, 1, 1], 10_000), 104);
    }

    #[test]
    fn too_few_pixels_never_match() {
        assert_eq!(pattern_match_variance(&[1, 1, 1], &[1, 1, 3], 204), u32::MAX);
    }

    #[test]
    fn scan_lines_cover_top_and_bottom() {
        let lines: Vec<usize> = scan_lines(100, 5).collect();
        assert_eq!(lines, vec![0, 24, 49, 74, 99]);
        assert_eq!(scan_lines(3, 15).count(), 3);
        assert_eq!(scan_lines(10, 1).collect::<Vec<_>>(), vec![0]);
    }
}
