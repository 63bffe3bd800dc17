//! Разбор потока данных QR версии 1: режимы Numeric, Alphanumeric, Byte.
//!
//! Длины счётчиков символов — для версий 1..9: 10 / 9 / 8 бит.
//! ECI, Kanji, Structured Append и FNC1 не поддерживаются → `Format`.

use crate::core::types::{DecodeError, DecodeResult};

const ALPHANUMERIC_CHARS: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Битридер: MSB-first по байтам.
struct BitSource<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BitSource<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    #[inline]
    fn available(&self) -> usize {
        self.bytes.len() * 8 - self.pos
    }

    fn read(&mut self, n: usize) -> DecodeResult<u32> {
        if n > 32 || n > self.available() {
            return Err(DecodeError::Format);
        }
        let mut v = 0u32;
        for _ in 0..n {
            let bit = (self.bytes[self.pos / 8] >> (7 - self.pos % 8)) & 1;
            v = (v << 1) | u32::from(bit);
            self.pos += 1;
        }
        Ok(v)
    }
}

/// Результат разбора потока.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedContent {
    pub text: String,
    pub byte_segments: Vec<Vec<u8>>,
}

/// Разобрать data-кодворды версии 1 в текст.
pub fn decode_bitstream(data: &[u8]) -> DecodeResult<DecodedContent> {
    let mut bits = BitSource::new(data);
    let mut out = DecodedContent::default();
    loop {
        // меньше 4 бит — неявный терминатор
        if bits.available() < 4 {
            break;
        }
        match bits.read(4)? {
            0b0000 => break,
            0b0001 => decode_numeric(&mut bits, &mut out.text)?,
            0b0010 => decode_alphanumeric(&mut bits, &mut out.text)?,
            0b0100 => {
                let segment = decode_byte(&mut bits, &mut out.text)?;
                out.byte_segments.push(segment);
            }
            mode => {
                log::debug!("qr: неподдерживаемый режим {mode:04b}");
                return Err(DecodeError::Format);
            }
        }
    }
    Ok(out)
}

/// Группа из `digits` цифр; значение вне диапазона — `Format`.
fn push_digits(value: u32, digits: usize, text: &mut String) -> DecodeResult<()> {
    if value >= 10u32.pow(digits as u32) {
        return Err(DecodeError::Format);
    }
    text.push_str(&format!("{value:0digits$}"));
    Ok(())
}

fn decode_numeric(bits: &mut BitSource<'_>, text: &mut String) -> DecodeResult<()> {
    let mut count = bits.read(10)? as usize;
    while count >= 3 {
        push_digits(bits.read(10)?, 3, text)?;
        count -= 3;
    }
    match count {
        2 => push_digits(bits.read(7)?, 2, text)?,
        1 => push_digits(bits.read(4)?, 1, text)?,
        _ => {}
    }
    Ok(())
}

fn alphanumeric_char(value: u32) -> DecodeResult<char> {
    ALPHANUMERIC_CHARS
        .get(value as usize)
        .map(|&c| char::from(c))
        .ok_or(DecodeError::Format)
}

fn decode_alphanumeric(bits: &mut BitSource<'_>, text: &mut String) -> DecodeResult<()> {
    let mut count = bits.read(9)? as usize;
    while count > 1 {
        let pair = bits.read(11)?;
        text.push(alphanumeric_char(pair / 45)?);
        text.push(alphanumeric_char(pair % 45)?);
        count -= 2;
    }
    if count == 1 {
        text.push(alphanumeric_char(bits.read(6)?)?);
    }
    Ok(())
}

/// Byte mode: UTF-8, если байты валидны, иначе ISO-8859-1.
fn decode_byte(bits: &mut BitSource<'_>, text: &mut String) -> DecodeResult<Vec<u8>> {
    let count = bits.read(8)? as usize;
    if count * 8 > bits.available() {
        return Err(DecodeError::Format);
    }
    let mut segment = Vec::with_capacity(count);
    for _ in 0..count {
        segment.push(bits.read(8)? as u8);
    }
    match std::str::from_utf8(&segment) {
        Ok(s) => text.push_str(s),
        Err(_) => text.extend(segment.iter().map(|&b| char::from(b))),
    }
    Ok(segment)
}

/// Собрать data-кодворды (Byte mode) ёмкостью `capacity` байт: заголовок,
/// терминатор, выравнивание и пад-байты 0xEC/0x11. `None`, если не влезает.
pub fn encode_byte_mode(payload: &[u8], capacity: usize) -> Option<Vec<u8>> {
    if payload.len() > 255 || 12 + payload.len() * 8 > capacity * 8 {
        return None;
    }
    let mut bits: Vec<bool> = Vec::with_capacity(capacity * 8);
    let mut push = |value: u32, n: usize| {
        bits.extend((0..n).rev().map(|i| (value >> i) & 1 != 0));
    };
    push(0b0100, 4);
    push(payload.len() as u32, 8);
    for &b in payload {
        push(u32::from(b), 8);
    }
    let term = (capacity * 8 - bits.len()).min(4);
    bits.extend(std::iter::repeat(false).take(term));
    while bits.len() % 8 != 0 {
        bits.push(false);
    }

    let mut out: Vec<u8> = bits
        .chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | u8::from(b)))
        .collect();
    for pad in [0xEC, 0x11].into_iter().cycle() {
        if out.len() >= capacity {
            break;
        }
        out.push(pad);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_reference_stream() {
        // "01234567" из приложения стандарта
        let data = [0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11];
        let got = decode_bitstream(&data).unwrap();
        assert_eq!(got.text, "01234567");
        assert!(got.byte_segments.is_empty());
    }

    #[test]
    fn alphanumeric_reference_stream() {
        // "AC-42": 0010 000000101 00111001110 11100111001 000010 0000
        let data = [0x20, 0x29, 0xCE, 0xE7, 0x21, 0x00];
        assert_eq!(decode_bitstream(&data).unwrap().text, "AC-42");
    }

    #[test]
    fn byte_mode_round_trip_and_segments() {
        let data = encode_byte_mode(b"HELLO", 19).unwrap();
        assert_eq!(data.len(), 19);
        assert_eq!(&data[..2], &[0x40, 0x54]);
        let got = decode_bitstream(&data).unwrap();
        assert_eq!(got.text, "HELLO");
        assert_eq!(got.byte_segments, vec![b"HELLO".to_vec()]);
    }

    #[test]
    fn byte_mode_falls_back_to_latin1() {
        let data = encode_byte_mode(&[0x41, 0xE9], 19).unwrap();
        assert_eq!(decode_bitstream(&data).unwrap().text, "A\u{e9}");
    }

    #[test]
    fn unsupported_mode_is_format_error() {
        // 0111 — ECI
        assert_eq!(decode_bitstream(&[0x70, 0x00]), Err(DecodeError::Format));
    }

    #[test]
    fn truncated_byte_segment_is_format_error() {
        // Byte mode, длина 10, но данных нет
        assert_eq!(decode_bitstream(&[0x40, 0xA0]), Err(DecodeError::Format));
    }

    #[test]
    fn capacity_is_enforced() {
        assert!(encode_byte_mode(&[0u8; 17], 19).is_some());
        assert!(encode_byte_mode(&[0u8; 18], 19).is_none());
        assert!(encode_byte_mode(&[0u8; 7], 9).is_some());
    }
}
