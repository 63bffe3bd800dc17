// src/qr/rs.rs
//! Рид–Соломон для QR (GF(256), примитивный полином 0x11D, база генератора 0).
//! Таблицы exp/log считаются на этапе компиляции. Есть кодирование (EC-байты)
//! и исправление ошибок: синдромы → алгоритм Евклида → Чиен → Форни.

use crate::core::types::{DecodeError, DecodeResult};

const GF_PRIM: u16 = 0x11D; // x^8 + x^4 + x^3 + x^2 + 1

struct Tables {
    /// α^i, продублировано до 512, чтобы умножать без `% 255`.
    exp: [u8; 512],
    log: [u8; 256],
}

const fn build_tables() -> Tables {
    let mut exp = [0u8; 512];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        exp[i + 255] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= GF_PRIM;
        }
        i += 1;
    }
    Tables { exp, log }
}

static GF: Tables = build_tables();

#[inline]
fn gf_exp(e: usize) -> u8 {
    GF.exp[e % 255]
}

#[inline]
fn gf_log(a: u8) -> usize {
    debug_assert!(a != 0);
    GF.log[a as usize] as usize
}

#[inline]
fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    GF.exp[gf_log(a) + gf_log(b)]
}

#[inline]
fn gf_inv(a: u8) -> u8 {
    debug_assert!(a != 0);
    GF.exp[255 - gf_log(a)]
}

/// Многочлен над GF(256), коэффициенты от старшей степени к младшей.
/// Ведущих нулей нет (кроме нулевого многочлена `[0]`).
#[derive(Clone, Debug, PartialEq, Eq)]
struct Poly(Vec<u8>);

impl Poly {
    fn new(coeffs: &[u8]) -> Self {
        match coeffs.iter().position(|&c| c != 0) {
            Some(first) => Self(coeffs[first..].to_vec()),
            None => Self(vec![0]),
        }
    }

    fn zero() -> Self {
        Self(vec![0])
    }

    fn one() -> Self {
        Self(vec![1])
    }

    fn monomial(degree: usize, coeff: u8) -> Self {
        if coeff == 0 {
            return Self::zero();
        }
        let mut c = vec![0u8; degree + 1];
        c[0] = coeff;
        Self(c)
    }

    #[inline]
    fn degree(&self) -> usize {
        self.0.len() - 1
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0[0] == 0
    }

    /// Коэффициент при x^degree.
    #[inline]
    fn coeff(&self, degree: usize) -> u8 {
        self.0[self.0.len() - 1 - degree]
    }

    fn eval(&self, a: u8) -> u8 {
        match a {
            0 => self.coeff(0),
            1 => self.0.iter().fold(0, |acc, &c| acc ^ c),
            _ => self.0.iter().fold(0, |acc, &c| gf_mul(a, acc) ^ c),
        }
    }

    fn add(&self, other: &Self) -> Self {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        let (small, large) = if self.0.len() > other.0.len() {
            (&other.0, &self.0)
        } else {
            (&self.0, &other.0)
        };
        let diff = large.len() - small.len();
        let mut sum = large[..diff].to_vec();
        sum.extend(large[diff..].iter().zip(small).map(|(&a, &b)| a ^ b));
        Self::new(&sum)
    }

    fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let mut product = vec![0u8; self.0.len() + other.0.len() - 1];
        for (i, &a) in self.0.iter().enumerate() {
            for (j, &b) in other.0.iter().enumerate() {
                product[i + j] ^= gf_mul(a, b);
            }
        }
        Self::new(&product)
    }

    fn scale(&self, s: u8) -> Self {
        match s {
            0 => Self::zero(),
            1 => self.clone(),
            _ => Self::new(&self.0.iter().map(|&c| gf_mul(c, s)).collect::<Vec<_>>()),
        }
    }

    fn mul_monomial(&self, degree: usize, coeff: u8) -> Self {
        if coeff == 0 {
            return Self::zero();
        }
        let mut c: Vec<u8> = self.0.iter().map(|&v| gf_mul(v, coeff)).collect();
        c.resize(c.len() + degree, 0);
        Self::new(&c)
    }

    /// Остаток от деления на `divisor`.
    fn rem(&self, divisor: &Self) -> Self {
        debug_assert!(!divisor.is_zero());
        let inv_lead = gf_inv(divisor.coeff(divisor.degree()));
        let mut rem = self.clone();
        while !rem.is_zero() && rem.degree() >= divisor.degree() {
            let shift = rem.degree() - divisor.degree();
            let scale = gf_mul(rem.coeff(rem.degree()), inv_lead);
            rem = rem.add(&divisor.mul_monomial(shift, scale));
        }
        rem
    }
}

/// g(x) = ∏ (x - α^i), i = 0..ec_len.
fn generator_poly(ec_len: usize) -> Poly {
    (0..ec_len).fold(Poly::one(), |g, i| g.mul(&Poly::new(&[1, gf_exp(i)])))
}

/// Вернуть `ec_len` байт ECC для `data`. Систематический код.
pub fn rs_ec_bytes(data: &[u8], ec_len: usize) -> Vec<u8> {
    if ec_len == 0 {
        return Vec::new();
    }
    let info = Poly::new(data).mul_monomial(ec_len, 1);
    let rem = info.rem(&generator_poly(ec_len));
    let mut out = vec![0u8; ec_len];
    if !rem.is_zero() {
        let coeffs = &rem.0;
        out[ec_len - coeffs.len()..].copy_from_slice(coeffs);
    }
    out
}

/// Исправить блок `codewords` (данные + `ec_len` байт ECC) на месте.
/// Возвращает число исправленных байт или `Checksum`, если блок неисправим.
pub fn rs_correct(codewords: &mut [u8], ec_len: usize) -> DecodeResult<usize> {
    let received = Poly::new(codewords);
    let mut syndromes = vec![0u8; ec_len];
    let mut clean = true;
    for i in 0..ec_len {
        let s = received.eval(gf_exp(i));
        syndromes[ec_len - 1 - i] = s;
        clean &= s == 0;
    }
    if clean {
        return Ok(0);
    }

    let (sigma, omega) = run_euclidean(Poly::monomial(ec_len, 1), Poly::new(&syndromes), ec_len)?;
    let locations = find_error_locations(&sigma)?;
    let magnitudes = find_error_magnitudes(&omega, &locations);

    for (&loc, &mag) in locations.iter().zip(&magnitudes) {
        let back = gf_log(loc);
        if back >= codewords.len() {
            return Err(DecodeError::Checksum);
        }
        let pos = codewords.len() - 1 - back;
        codewords[pos] ^= mag;
    }
    Ok(locations.len())
}

/// Расширенный алгоритм Евклида → (σ(x) — локаторы, ω(x) — величины).
fn run_euclidean(a: Poly, b: Poly, r: usize) -> DecodeResult<(Poly, Poly)> {
    let (mut r_last, mut r_cur) = if a.degree() < b.degree() { (b, a) } else { (a, b) };
    let mut t_last = Poly::zero();
    let mut t_cur = Poly::one();

    while r_cur.degree() >= r / 2 {
        let r_last_last = std::mem::replace(&mut r_last, r_cur.clone());
        let t_last_last = std::mem::replace(&mut t_last, t_cur.clone());
        if r_last.is_zero() {
            return Err(DecodeError::Checksum);
        }

        let mut rem = r_last_last;
        let mut q = Poly::zero();
        let inv_lead = gf_inv(r_last.coeff(r_last.degree()));
        while rem.degree() >= r_last.degree() && !rem.is_zero() {
            let shift = rem.degree() - r_last.degree();
            let scale = gf_mul(rem.coeff(rem.degree()), inv_lead);
            q = q.add(&Poly::monomial(shift, scale));
            rem = rem.add(&r_last.mul_monomial(shift, scale));
        }
        t_cur = q.mul(&t_last).add(&t_last_last);
        if rem.degree() >= r_last.degree() {
            return Err(DecodeError::Checksum);
        }
        r_cur = rem;
    }

    let sigma_at_zero = t_cur.coeff(0);
    if sigma_at_zero == 0 {
        return Err(DecodeError::Checksum);
    }
    let inv = gf_inv(sigma_at_zero);
    Ok((t_cur.scale(inv), r_cur.scale(inv)))
}

/// Поиск Чиена: корни σ(x), возвращаем обратные им локаторы.
fn find_error_locations(sigma: &Poly) -> DecodeResult<Vec<u8>> {
    let num_errors = sigma.degree();
    if num_errors == 1 {
        return Ok(vec![sigma.coeff(1)]);
    }
    let locations: Vec<u8> = (1..=255u8)
        .filter(|&i| sigma.eval(i) == 0)
        .map(gf_inv)
        .take(num_errors)
        .collect();
    if locations.len() != num_errors {
        return Err(DecodeError::Checksum);
    }
    Ok(locations)
}

/// Форни: величины ошибок по ω(x) и локаторам.
fn find_error_magnitudes(omega: &Poly, locations: &[u8]) -> Vec<u8> {
    locations
        .iter()
        .enumerate()
        .map(|(i, &xi)| {
            let xi_inv = gf_inv(xi);
            let denominator = locations
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .fold(1u8, |acc, (_, &xj)| {
                    // 1 + xj·xi⁻¹ в GF(2^8) — это xor младшего бита
                    let term = gf_mul(xj, xi_inv);
                    gf_mul(acc, term ^ 1)
                });
            gf_mul(omega.eval(xi_inv), gf_inv(denominator))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(data_len: usize, ec_len: usize) -> Vec<u8> {
        let data: Vec<u8> = (0..data_len).map(|i| (i as u8).wrapping_mul(37) ^ 0xA5).collect();
        let mut cw = data.clone();
        cw.extend(rs_ec_bytes(&data, ec_len));
        cw
    }

    #[test]
    fn field_tables_are_consistent() {
        assert_eq!(gf_exp(0), 1);
        assert_eq!(gf_exp(8), 0x1D);
        for a in 1..=255u8 {
            assert_eq!(gf_mul(a, gf_inv(a)), 1);
        }
    }

    #[test]
    fn known_qr_ec_bytes() {
        // ISO/IEC 18004, приложение I: "01234567", 1-M
        let data = [0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11];
        let ec = rs_ec_bytes(&data, 10);
        assert_eq!(ec, vec![0xA5, 0x24, 0xD4, 0xC1, 0xED, 0x36, 0xC7, 0x87, 0x2C, 0x55]);
    }

    #[test]
    fn clean_block_needs_no_correction() {
        let mut cw = block(19, 7);
        assert_eq!(rs_correct(&mut cw, 7), Ok(0));
    }

    #[test]
    fn corrects_up_to_half_the_ec_bytes() {
        let original = block(19, 7);
        let mut cw = original.clone();
        cw[0] ^= 0xFF;
        cw[10] ^= 0x01;
        cw[25] ^= 0x5A;
        assert_eq!(rs_correct(&mut cw, 7), Ok(3));
        assert_eq!(cw, original);
    }

    #[test]
    fn corrects_single_error_in_long_ec_block() {
        let original = block(9, 17);
        let mut cw = original.clone();
        cw[4] ^= 0x33;
        assert_eq!(rs_correct(&mut cw, 17), Ok(1));
        assert_eq!(cw, original);
    }

    #[test]
    fn too_many_errors_is_checksum_error() {
        let mut cw = block(19, 7);
        for (i, b) in cw.iter_mut().enumerate().take(12) {
            *b ^= (i as u8).wrapping_mul(29) | 1;
        }
        assert_eq!(rs_correct(&mut cw, 7), Err(DecodeError::Checksum));
    }
}
