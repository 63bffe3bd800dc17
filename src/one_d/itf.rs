//! Декодер Interleaved 2 of 5 (ITF) по одной бинарной строке.
//!
//! Алгоритм:
//! 1) Пропускаем белое слева, ищем стартовый guard `N N N N` (бар/пробел ×2).
//! 2) Ширина узкого модуля = длина старта / 4; перед стартом нужна тихая зона
//!    не короче 10 узких модулей.
//! 3) Конечный guard ищем на развёрнутой строке (`N N W` справа налево),
//!    с той же проверкой тихой зоны, и переводим координаты обратно.
//! 4) Между guard'ами читаем группы по 10 run'ов: чёрные — первая цифра пары,
//!    белые — вторая. Каждая пятёрка — код «2 из 5».
//! 5) Длина строки должна входить в список разрешённых.

use log::debug;

use super::{pattern_match_variance, record_pattern};
use crate::api::Reader;
use crate::core::bits::{BitMatrix, BitRow};
use crate::core::types::{DecodeError, DecodeHints, DecodeResult, DecodedExtras, DecodedSymbol, Point, Symbology};

/// Длины по умолчанию: ITF без внешнего ограничения слишком легко «находится» в шуме.
pub const DEFAULT_ALLOWED_LENGTHS: [usize; 10] = [44, 24, 20, 18, 16, 14, 12, 10, 8, 6];

const MAX_AVG_VARIANCE: u32 = 107;
const MAX_INDIVIDUAL_VARIANCE: u32 = 204;

/// Тихая зона — в узких модулях.
const QUIET_ZONE_MODULES: usize = 10;

const N: u32 = 1; // узкий
const W: u32 = 3; // широкий

const START_PATTERN: [u32; 4] = [N, N, N, N];
const END_PATTERN_REVERSED: [u32; 3] = [N, N, W];

/// Цифры 0..9: ширины пяти элементов, ровно два широких.
const PATTERNS: [[u32; 5]; 10] = [
    [N, N, W, W, N], // 0
    [W, N, N, N, W], // 1
    [N, W, N, N, W], // 2
    [W, W, N, N, N], // 3
    [N, N, W, N, W], // 4
    [W, N, W, N, N], // 5
    [N, W, W, N, N], // 6
    [N, N, N, W, W], // 7
    [W, N, N, W, N], // 8
    [N, W, N, W, N], // 9
];

/// Положение guard'а в строке: `[start, end)` в пикселях.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GuardRange {
    pub start: usize,
    pub end: usize,
}

/// Декодер ITF. Состояния между вызовами не держит: ширина узкого модуля
/// живёт только внутри одного `decode_row`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ItfReader;

impl ItfReader {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Декодировать одну строку. `row` временно разворачивается при поиске
    /// конечного guard'а и всегда возвращается в исходное состояние.
    pub fn decode_row(&self, row_number: usize, row: &mut BitRow, hints: &DecodeHints) -> DecodeResult<DecodedSymbol> {
        let (start_range, narrow) = decode_start(row)?;
        let end_range = decode_end(row, narrow)?;

        let mut text = String::with_capacity(20);
        decode_middle(row, start_range.end, end_range.start, &mut text)?;

        let allowed = hints
            .allowed_lengths
            .as_deref()
            .unwrap_or(&DEFAULT_ALLOWED_LENGTHS);
        if !allowed.contains(&text.len()) {
            debug!("itf: длина {} не из списка {allowed:?}", text.len());
            return Err(DecodeError::Format);
        }

        let y = row_number as f32;
        Ok(DecodedSymbol::new(Symbology::Itf, text)
            .with_points(vec![
                Point::new(start_range.end as f32, y),
                Point::new(end_range.start as f32, y),
            ])
            .with_extras(DecodedExtras::new().with("row", row_number.to_string())))
    }
}

impl Reader for ItfReader {
    fn symbology(&self) -> Symbology {
        Symbology::Itf
    }

    fn decode(&self, image: &BitMatrix, hints: &DecodeHints) -> DecodeResult<DecodedSymbol> {
        super::decode_rows(self, image, hints)
    }
}

/// Стартовый guard + проверка тихой зоны. Возвращает guard и ширину узкого модуля.
fn decode_start(row: &BitRow) -> DecodeResult<(GuardRange, usize)> {
    let guard = find_guard_pattern(row, skip_white_space(row)?, &START_PATTERN)?;
    // старт — это 4 узких модуля
    let narrow = (guard.end - guard.start) / 4;
    validate_quiet_zone(row, guard.start, narrow)?;
    Ok((guard, narrow))
}

/// Конечный guard ищется на развёрнутой строке; результат — в исходных координатах.
fn decode_end(row: &mut BitRow, narrow: usize) -> DecodeResult<GuardRange> {
    let reversed = row.reversed();
    let guard = find_guard_pattern(&reversed, skip_white_space(&reversed)?, &END_PATTERN_REVERSED)?;
    validate_quiet_zone(&reversed, guard.start, narrow)?;
    let width = reversed.len();
    Ok(GuardRange {
        start: width - guard.end,
        end: width - guard.start,
    })
}

/// Первый чёрный пиксель строки; строка без чёрного — `NotFound`.
fn skip_white_space(row: &BitRow) -> DecodeResult<usize> {
    let start = row.get_next_set(0);
    if start == row.len() {
        return Err(DecodeError::NotFound);
    }
    Ok(start)
}

/// Перед `start` должно быть не меньше `10 × narrow` белых пикселей подряд.
fn validate_quiet_zone(row: &BitRow, start: usize, narrow: usize) -> DecodeResult<()> {
    let needed = narrow * QUIET_ZONE_MODULES;
    let quiet = (0..start).rev().take(needed).take_while(|&i| !row.get(i)).count();
    if quiet < needed {
        debug!("itf: тихая зона {quiet} < {needed} перед x={start}");
        return Err(DecodeError::NotFound);
    }
    Ok(())
}

/// Найти guard `pattern` скользящим окном run'ов, начиная с `offset` (чёрный пиксель).
fn find_guard_pattern<const L: usize>(row: &BitRow, offset: usize, pattern: &[u32; L]) -> DecodeResult<GuardRange> {
    let mut counters = [0u32; L];
    let mut position = 0usize;
    let mut pattern_start = offset;
    let mut is_white = false;

    for x in offset..row.len() {
        if row.get(x) != is_white {
            counters[position] += 1;
            continue;
        }
        if position + 1 < L {
            position += 1;
        } else {
            if pattern_match_variance(&counters, pattern, MAX_INDIVIDUAL_VARIANCE) < MAX_AVG_VARIANCE {
                return Ok(GuardRange { start: pattern_start, end: x });
            }
            // сдвигаем окно на пару бар+пробел
            pattern_start += (counters[0] + counters[1]) as usize;
            counters.copy_within(2.., 0);
            counters[L - 2] = 0;
            counters[L - 1] = 0;
            position -= 1;
        }
        counters[position] = 1;
        is_white = !is_white;
    }
    Err(DecodeError::NotFound)
}

/// Пары цифр между `payload_start` и `payload_end`.
fn decode_middle(row: &BitRow, mut payload_start: usize, payload_end: usize, out: &mut String) -> DecodeResult<()> {
    let mut pair = [0u32; 10];
    let mut black = [0u32; 5];
    let mut white = [0u32; 5];

    while payload_start < payload_end {
        record_pattern(row, payload_start, &mut pair)?;
        for k in 0..5 {
            black[k] = pair[2 * k];
            white[k] = pair[2 * k + 1];
        }
        out.push(char::from(b'0' + decode_digit(&black)?));
        out.push(char::from(b'0' + decode_digit(&white)?));
        payload_start += pair.iter().sum::<u32>() as usize;
    }
    Ok(())
}

/// Ближайшая цифра по пяти ширинам. При равенстве побеждает меньшая цифра.
fn decode_digit(counters: &[u32; 5]) -> DecodeResult<u8> {
    let mut best_variance = MAX_AVG_VARIANCE;
    let mut best = None;
    for (digit, pattern) in PATTERNS.iter().enumerate() {
        let variance = pattern_match_variance(counters, pattern, MAX_INDIVIDUAL_VARIANCE);
        if variance < best_variance {
            best_variance = variance;
            best = Some(digit as u8);
        }
    }
    best.ok_or(DecodeError::NotFound)
}

/// Синтез идеальной строки ITF (true = чёрный) по строке цифр чётной длины.
///
/// `unit` — ширина узкого модуля в пикселях (широкий = 3 unit), тихие зоны —
/// по 10 модулей с обеих сторон. Возвращает `None`, если вход не из цифр
/// или длина нечётная.
pub fn synthesize_itf_row(digits: &str, unit: usize) -> Option<Vec<bool>> {
    if digits.len() % 2 != 0 || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let unit = unit.max(1);
    let quiet = QUIET_ZONE_MODULES * unit;

    let mut runs: Vec<u32> = Vec::new();
    runs.extend_from_slice(&START_PATTERN);
    let ds: Vec<usize> = digits.bytes().map(|c| usize::from(c - b'0')).collect();
    for pair in ds.chunks(2) {
        let (a, b) = (PATTERNS[pair[0]], PATTERNS[pair[1]]);
        for k in 0..5 {
            runs.push(a[k]);
            runs.push(b[k]);
        }
    }
    // конечный guard слева направо: W N N
    runs.extend(END_PATTERN_REVERSED.iter().rev());

    let mut px = vec![false; quiet];
    let mut black = true;
    for r in runs {
        px.extend(std::iter::repeat(black).take(r as usize * unit));
        black = !black;
    }
    px.extend(std::iter::repeat(false).take(quiet));
    Some(px)
}
