// Извлечение сетки модулей из «чистого» символа: изображение уже выровнено
// по осям и обрезано вокруг символа, перспективы нет.
//
// Шаги:
// - углы: первый и последний чёрный пиксель в порядке чтения;
// - размер модуля — по диагонали левого верхнего finder'а (7 модулей до 5-го перехода);
// - размеры сетки по экстентам, квадрат обязателен;
// - выборка центров модулей, ближайший пиксель, без интерполяции.

use log::debug;

use crate::core::bits::BitMatrix;
use crate::core::types::{DecodeError, DecodeResult};

/// Модулей по диагонали finder'а от внешнего угла до белого сепаратора.
const FINDER_DIAGONAL_MODULES: f32 = 7.0;

/// Переходов цвета по диагонали finder'а: ч→б→ч→б→ч→б(сепаратор).
const FINDER_DIAGONAL_TRANSITIONS: u32 = 5;

/// Оценка размера модуля (в пикселях) по диагонали от левого верхнего чёрного пикселя.
pub fn module_size(top_left: (usize, usize), image: &BitMatrix) -> DecodeResult<f32> {
    let (width, height) = (image.width(), image.height());
    let (mut x, mut y) = top_left;
    let mut in_black = true;
    let mut transitions = 0;
    while x < width && y < height {
        if in_black != image.get(x, y) {
            transitions += 1;
            if transitions == FINDER_DIAGONAL_TRANSITIONS {
                break;
            }
            in_black = !in_black;
        }
        x += 1;
        y += 1;
    }
    if x == width || y == height {
        debug!("qr/pure: диагональ finder'а упёрлась в край ({x},{y})");
        return Err(DecodeError::NotFound);
    }
    Ok((x - top_left.0) as f32 / FINDER_DIAGONAL_MODULES)
}

/// Пересэмплировать чистый символ в матрицу модулей.
pub fn extract_pure_bits(image: &BitMatrix) -> DecodeResult<BitMatrix> {
    let (Some(top_left), Some(bottom_right)) = (image.top_left_on_bit(), image.bottom_right_on_bit()) else {
        return Err(DecodeError::NotFound);
    };
    let module = module_size(top_left, image)?;

    let (mut left, mut top) = top_left;
    let (mut right, bottom) = bottom_right;
    // bottom >= top по порядку чтения; символ квадратный, поэтому
    // расхождение экстентов правим по высоте
    let extent = bottom - top;
    if right < left || right - left != extent {
        right = left + extent;
        if right >= image.width() {
            return Err(DecodeError::NotFound);
        }
    }

    let matrix_width = ((right - left + 1) as f32 / module).round() as usize;
    let matrix_height = ((bottom - top + 1) as f32 / module).round() as usize;
    if matrix_width == 0 || matrix_height == 0 {
        return Err(DecodeError::NotFound);
    }
    // экстенты уже равны после выравнивания правого края
    if matrix_width != matrix_height {
        debug!("qr/pure: не квадрат {matrix_width}×{matrix_height}");
        return Err(DecodeError::NotFound);
    }

    // сдвигаемся на полмодуля внутрь — выбираем центры модулей, а не края
    let nudge = (module / 2.0) as usize;
    top += nudge;
    left += nudge;

    // последний столбец/строка не должны вылезать за символ
    let offset = |i: usize| (i as f32 * module).round() as usize;
    let last = offset(matrix_width - 1);
    left = pull_back(left, last, right, nudge)?;
    top = pull_back(top, last, bottom, nudge)?;

    let mut bits = BitMatrix::new(matrix_width, matrix_height);
    for y in 0..matrix_height {
        let iy = top + offset(y);
        for x in 0..matrix_width {
            if image.get(left + offset(x), iy) {
                bits.set(x, y);
            }
        }
    }
    Ok(bits)
}

/// Если `origin + last` вылезает за `limit`, сдвинуть начало назад — но не дальше `nudge`.
fn pull_back(origin: usize, last: usize, limit: usize, nudge: usize) -> DecodeResult<usize> {
    let overshoot = (origin + last).saturating_sub(limit);
    if overshoot > nudge {
        return Err(DecodeError::NotFound);
    }
    Ok(origin - overshoot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::encode::{render_modules, synthesize_qr_v1};
    use crate::qr::format::EcLevel;

    fn v1(text: &str) -> BitMatrix {
        synthesize_qr_v1(text, EcLevel::L, 3).expect("fits in v1-L")
    }

    #[test]
    fn module_size_recovered_from_finder_diagonal() {
        let modules = v1("HELLO");
        for unit in [1usize, 3, 4, 7] {
            let img = render_modules(&modules, unit, 4);
            let tl = img.top_left_on_bit().unwrap();
            assert_eq!(tl, (4 * unit, 4 * unit));
            let size = module_size(tl, &img).unwrap();
            assert!((size - unit as f32).abs() < 1e-4, "unit {unit}: {size}");
        }
    }

    #[test]
    fn resampling_reconstructs_the_grid() {
        let modules = v1("stripcode");
        for unit in [2usize, 3, 5] {
            let img = render_modules(&modules, unit, 2);
            let bits = extract_pure_bits(&img).expect("clean symbol");
            assert_eq!(bits, modules, "unit {unit}");
        }
    }

    #[test]
    fn resampling_without_quiet_zone() {
        let modules = v1("A");
        let img = render_modules(&modules, 4, 0);
        assert_eq!(extract_pure_bits(&img).unwrap(), modules);
    }

    #[test]
    fn empty_image_is_not_found() {
        assert_eq!(extract_pure_bits(&BitMatrix::new(30, 30)), Err(DecodeError::NotFound));
    }

    #[test]
    fn diagonal_hitting_edge_is_not_found() {
        // сплошной чёрный квадрат: переходов нет, диагональ доходит до края
        let mut img = BitMatrix::new(10, 10);
        for y in 0..10 {
            for x in 0..10 {
                img.set(x, y);
            }
        }
        assert_eq!(module_size((0, 0), &img), Err(DecodeError::NotFound));
        assert_eq!(extract_pure_bits(&img), Err(DecodeError::NotFound));
    }

    #[test]
    fn forced_square_outside_image_is_not_found() {
        // finder 7×7 модулей по 2 px, а нижний правый пиксель далеко внизу:
        // правый край, выровненный по высоте, вылезает за изображение
        let modules = v1("A");
        let wide = render_modules(&modules, 2, 0);
        let mut img = BitMatrix::new(wide.width(), wide.height() + 20);
        for y in 0..wide.height() {
            for x in 0..wide.width() {
                if wide.get(x, y) {
                    img.set(x, y);
                }
            }
        }
        img.set(0, wide.height() + 19);
        assert_eq!(extract_pure_bits(&img), Err(DecodeError::NotFound));
    }
}
