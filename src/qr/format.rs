//! QR: формат-инфо (15 бит), BCH(15,5), маскирование 0x5412.
//!
//! Здесь:
//! - перечисление уровня коррекции ошибок [`EcLevel`] и раскладка блоков v1;
//! - декодирование 15-битного слова [`decode_format_word`];
//! - координаты двух копий формата для версии 1 [`FORMAT_INFO_COORDS_V1`].

use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EcLevel {
    L,
    M,
    Q,
    H,
}

impl EcLevel {
    pub const ALL: [EcLevel; 4] = [EcLevel::L, EcLevel::M, EcLevel::Q, EcLevel::H];

    /// Два бита уровня EC по стандарту: L=01, M=00, Q=11, H=10.
    #[inline]
    pub fn to_bits2(self) -> u8 {
        match self {
            EcLevel::L => 0b01,
            EcLevel::M => 0b00,
            EcLevel::Q => 0b11,
            EcLevel::H => 0b10,
        }
    }

    /// Обратное преобразование двух бит в уровень EC.
    #[inline]
    pub fn from_bits2(b2: u8) -> Self {
        match b2 & 0b11 {
            0b01 => EcLevel::L,
            0b00 => EcLevel::M,
            0b11 => EcLevel::Q,
            _ => EcLevel::H,
        }
    }

    /// Версия 1 — всегда один RS-блок из 26 кодвордов: (data, ec).
    #[inline]
    pub fn v1_block(self) -> (usize, usize) {
        match self {
            EcLevel::L => (19, 7),
            EcLevel::M => (16, 10),
            EcLevel::Q => (13, 13),
            EcLevel::H => (9, 17),
        }
    }
}

impl fmt::Display for EcLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EcLevel::L => "L",
            EcLevel::M => "M",
            EcLevel::Q => "Q",
            EcLevel::H => "H",
        };
        f.write_str(s)
    }
}

/// Генератор BCH(15,5): x^10 + x^8 + x^5 + x^4 + x^2 + x + 1
const BCH15_5_GEN: u16 = 0x537;
/// Маска формата из стандарта
const FORMAT_MASK: u16 = 0x5412;

/// Остаток от деления (data<<10) на генератор BCH по mod 2.
fn bch_remainder_15_5(mut v: u16) -> u16 {
    for shift in (10..=14).rev() {
        if (v >> shift) & 1 == 1 {
            v ^= BCH15_5_GEN << (shift - 10);
        }
    }
    v & 0x03FF
}

/// Финальное (замаскированное) 15-битное слово формата.
pub fn encode_format_word(ec: EcLevel, mask_id: u8) -> u16 {
    let data5 = (u16::from(ec.to_bits2()) << 3) | u16::from(mask_id & 0x7);
    let payload = data5 << 10;
    (payload | bch_remainder_15_5(payload)) ^ FORMAT_MASK
}

/// Разобранное слово формата.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FormatInfo {
    pub ec_level: EcLevel,
    pub mask_id: u8,
    /// Расстояние Хэмминга до ближайшего валидного слова.
    pub distance: u32,
}

/// Декодирование подбором по всем 32 валидным словам.
/// `None`, если ближайшее дальше 3 бит.
pub fn decode_format_word(word: u16) -> Option<FormatInfo> {
    EcLevel::ALL
        .iter()
        .flat_map(|&ec| (0u8..8).map(move |mask_id| (ec, mask_id)))
        .map(|(ec_level, mask_id)| FormatInfo {
            ec_level,
            mask_id,
            distance: (word ^ encode_format_word(ec_level, mask_id)).count_ones(),
        })
        .min_by_key(|info| info.distance)
        .filter(|info| info.distance <= 3)
}

/// Координаты (x, y) двух копий формата для версии 1 (21×21), от старшего бита к младшему.
///
/// 1) вокруг левого верхнего finder'а: строка y=8 (x=0..5, 7, 8), затем столбец x=8 (y=7, 5..0);
/// 2) столбец x=8 у левого нижнего (y=20..14), затем строка y=8 у правого верхнего (x=13..20).
pub const FORMAT_INFO_COORDS_V1: [[(usize, usize); 15]; 2] = [
    [
        (0, 8), (1, 8), (2, 8), (3, 8), (4, 8), (5, 8),
        (7, 8), (8, 8),
        (8, 7), (8, 5), (8, 4), (8, 3), (8, 2), (8, 1), (8, 0),
    ],
    [
        (8, 20), (8, 19), (8, 18), (8, 17), (8, 16), (8, 15), (8, 14),
        (13, 8), (14, 8), (15, 8), (16, 8), (17, 8), (18, 8), (19, 8), (20, 8),
    ],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_format_words() {
        // таблица из стандарта: L/маска 0 и H/маска 7
        assert_eq!(encode_format_word(EcLevel::L, 0), 0x77C4);
        assert_eq!(encode_format_word(EcLevel::M, 0), 0x5412);
        assert_eq!(encode_format_word(EcLevel::H, 7), 0x083B);
    }

    #[test]
    fn decodes_with_up_to_three_bit_errors() {
        for ec in EcLevel::ALL {
            for m in 0u8..8 {
                let w = encode_format_word(ec, m);
                let got = decode_format_word(w ^ 0b100_0000_0100_0001).expect("3 errors");
                assert_eq!((got.ec_level, got.mask_id, got.distance), (ec, m, 3));
            }
        }
    }

    #[test]
    fn far_word_is_rejected() {
        // ближайшие к нулю валидные слова (0x5412, 0x0255, ...) весят 5 бит
        assert_eq!(decode_format_word(0), None);
    }

    #[test]
    fn ec_bits_round_trip() {
        for ec in EcLevel::ALL {
            assert_eq!(EcLevel::from_bits2(ec.to_bits2()), ec);
            let (data, ecc) = ec.v1_block();
            assert_eq!(data + ecc, 26);
        }
    }
}
