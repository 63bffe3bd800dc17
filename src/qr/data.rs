//! QR v1 (21×21): служебные зоны, маски данных и порядок обхода «парами колонок».
//!
//! 1) [`is_function_v1`] — служебные модули (finder+separator+format, timing,
//!    тёмный модуль) — они не несут data/ECC бит.
//! 2) [`data_modules_v1`] — порядок чтения data-модулей: пары колонок (x, x-1)
//!    справа налево, «змейкой» по y; колонку x=6 (timing) пропускаем.
//! 3) [`read_codewords_v1`] / [`place_codewords_v1`] — снять / разместить 26
//!    кодвордов с учётом маски.

use crate::core::bits::BitMatrix;

/// Размер сетки для версии 1.
pub const N1: usize = 21;

/// Всего кодвордов (data + ECC) в версии 1.
pub const CODEWORDS_V1: usize = 26;

/// Является ли модуль служебным для QR v1.
///
/// Прямоугольники finder+separator+format: 9×9 слева сверху, 8×9 справа сверху,
/// 9×8 слева снизу (тёмный модуль (8, 13) попадает в последний), плюс timing-линии.
#[inline]
pub fn is_function_v1(x: usize, y: usize) -> bool {
    debug_assert!(x < N1 && y < N1);
    (x <= 8 && y <= 8) || (x >= N1 - 8 && y <= 8) || (x <= 8 && y >= N1 - 8) || x == 6 || y == 6
}

/// Условие маски `mask_id` для модуля (x — столбец, y — строка).
#[inline]
pub fn mask_hit(mask_id: u8, x: usize, y: usize) -> bool {
    match mask_id {
        0 => (x + y) % 2 == 0,
        1 => y % 2 == 0,
        2 => x % 3 == 0,
        3 => (x + y) % 3 == 0,
        4 => (y / 2 + x / 3) % 2 == 0,
        5 => (x * y) % 2 + (x * y) % 3 == 0,
        6 => ((x * y) % 2 + (x * y) % 3) % 2 == 0,
        7 => ((x + y) % 2 + (x * y) % 3) % 2 == 0,
        _ => false,
    }
}

/// Координаты data-модулей в порядке чтения (ровно 208 штук для v1).
pub fn data_modules_v1() -> impl Iterator<Item = (usize, usize)> {
    // правые колонки пар: 20, 18, …, 8, затем (после timing) 5, 3, 1
    let pair_columns = (7..N1).rev().step_by(2).chain((0..6).rev().step_by(2));
    pair_columns
        .enumerate()
        .flat_map(|(k, right)| {
            let upward = k % 2 == 0;
            (0..N1).flat_map(move |count| {
                let y = if upward { N1 - 1 - count } else { count };
                [(right, y), (right - 1, y)]
            })
        })
        .filter(|&(x, y)| !is_function_v1(x, y))
}

/// Снять 26 кодвордов (MSB-first), снимая маску `mask_id`.
pub fn read_codewords_v1(grid: &BitMatrix, mask_id: u8) -> Vec<u8> {
    debug_assert_eq!((grid.width(), grid.height()), (N1, N1));
    let mut out = Vec::with_capacity(CODEWORDS_V1);
    let mut cur = 0u8;
    for (k, (x, y)) in data_modules_v1().enumerate() {
        let bit = grid.get(x, y) ^ mask_hit(mask_id, x, y);
        cur = (cur << 1) | u8::from(bit);
        if k % 8 == 7 {
            out.push(cur);
            cur = 0;
        }
    }
    out
}

/// Разместить кодворды в data-модулях, накладывая маску `mask_id`.
pub fn place_codewords_v1(grid: &mut BitMatrix, codewords: &[u8], mask_id: u8) {
    let bits = codewords
        .iter()
        .flat_map(|&cw| (0..8).rev().map(move |i| (cw >> i) & 1 != 0));
    for ((x, y), bit) in data_modules_v1().zip(bits) {
        if bit ^ mask_hit(mask_id, x, y) {
            grid.set(x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_mask_counts_v1() {
        let func = (0..N1)
            .flat_map(|y| (0..N1).map(move |x| (x, y)))
            .filter(|&(x, y)| is_function_v1(x, y))
            .count();
        assert_eq!(func, 233, "function modules count");
        assert_eq!(N1 * N1 - func, 208, "data modules count");
    }

    #[test]
    fn walk_starts_bottom_right_and_skips_timing() {
        let path: Vec<(usize, usize)> = data_modules_v1().collect();
        assert_eq!(path.len(), CODEWORDS_V1 * 8);
        assert_eq!(&path[..4], &[(20, 20), (19, 20), (20, 19), (19, 19)]);
        assert!(path.iter().all(|&(x, _)| x != 6));
        // каждый модуль ровно один раз
        let mut seen = BitMatrix::square(N1);
        for &(x, y) in &path {
            assert!(!seen.get(x, y), "({x},{y}) twice");
            seen.set(x, y);
        }
    }

    #[test]
    fn codewords_survive_placement_with_every_mask() {
        let cw: Vec<u8> = (0..CODEWORDS_V1 as u8).map(|i| i.wrapping_mul(53) ^ 0x3C).collect();
        for mask in 0u8..8 {
            let mut grid = BitMatrix::square(N1);
            place_codewords_v1(&mut grid, &cw, mask);
            assert_eq!(read_codewords_v1(&grid, mask), cw, "mask {mask}");
        }
    }

    #[test]
    fn mask_000_is_checkerboard() {
        assert!(mask_hit(0, 0, 0));
        assert!(!mask_hit(0, 1, 0));
        assert!(mask_hit(1, 5, 2));
        assert!(mask_hit(2, 3, 1) && !mask_hit(2, 1, 3));
    }
}
