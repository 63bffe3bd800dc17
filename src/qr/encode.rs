//! Синтез QR v1 (Byte mode) в матрицу модулей: finders, timing, format, данные, маска.
//! Плюс отрисовка матрицы в пиксели — для тестов, бенчей и демо-бинарников.

use super::bitstream::encode_byte_mode;
use super::data::{place_codewords_v1, N1};
use super::format::{encode_format_word, EcLevel, FORMAT_INFO_COORDS_V1};
use super::rs::rs_ec_bytes;
use crate::core::bits::BitMatrix;
use crate::core::types::LumaImage;

/// Левые верхние углы трёх finder'ов v1.
const FINDER_ORIGINS_V1: [(usize, usize); 3] = [(0, 0), (N1 - 7, 0), (0, N1 - 7)];

fn draw_finder(grid: &mut BitMatrix, ox: usize, oy: usize) {
    for dy in 0..7 {
        for dx in 0..7 {
            let on_border = dx == 0 || dx == 6 || dy == 0 || dy == 6;
            let in_core = (2..=4).contains(&dx) && (2..=4).contains(&dy);
            if on_border || in_core {
                grid.set(ox + dx, oy + dy);
            }
        }
    }
}

/// Построить валидный QR v1 с текстом в Byte mode.
/// `None`, если текст не влезает в блок данных выбранного уровня или `mask_id > 7`.
pub fn synthesize_qr_v1(text: &str, ec: EcLevel, mask_id: u8) -> Option<BitMatrix> {
    if mask_id > 7 {
        return None;
    }
    let (data_len, ec_len) = ec.v1_block();
    let mut codewords = encode_byte_mode(text.as_bytes(), data_len)?;
    let ecc = rs_ec_bytes(&codewords, ec_len);
    codewords.extend_from_slice(&ecc);

    let mut grid = BitMatrix::square(N1);
    for (ox, oy) in FINDER_ORIGINS_V1 {
        draw_finder(&mut grid, ox, oy);
    }
    // timing между finder'ами: чёрные на чётных индексах
    for i in (8..N1 - 8).step_by(2) {
        grid.set(i, 6);
        grid.set(6, i);
    }
    // тёмный модуль
    grid.set(8, N1 - 8);

    let word = encode_format_word(ec, mask_id);
    for copy in &FORMAT_INFO_COORDS_V1 {
        for (k, &(x, y)) in copy.iter().enumerate() {
            if (word >> (14 - k)) & 1 == 1 {
                grid.set(x, y);
            }
        }
    }

    place_codewords_v1(&mut grid, &codewords, mask_id);
    Some(grid)
}

/// Отрисовать матрицу модулей: `unit` пикселей на модуль, `quiet` модулей белого поля.
pub fn render_modules(modules: &BitMatrix, unit: usize, quiet: usize) -> BitMatrix {
    let unit = unit.max(1);
    let w = (modules.width() + 2 * quiet) * unit;
    let h = (modules.height() + 2 * quiet) * unit;
    let mut out = BitMatrix::new(w, h);
    for my in 0..modules.height() {
        for mx in 0..modules.width() {
            if !modules.get(mx, my) {
                continue;
            }
            let (px, py) = ((mx + quiet) * unit, (my + quiet) * unit);
            for y in py..py + unit {
                for x in px..px + unit {
                    out.set(x, y);
                }
            }
        }
    }
    out
}

/// То же в оттенках серого: чёрный 0, белый 255.
pub fn render_luma(modules: &BitMatrix, unit: usize, quiet: usize) -> LumaImage {
    let bits = render_modules(modules, unit, quiet);
    let (width, height) = (bits.width(), bits.height());
    let data = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| if bits.get(x, y) { 0u8 } else { 255u8 })
        .collect();
    LumaImage { data, width, height }
}
