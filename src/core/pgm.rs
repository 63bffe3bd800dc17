//! Чтение/запись PGM P5 (8 бит, maxval=255) — для демо-бинарей и тестов.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use super::types::LumaImage;

fn invalid(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

fn read_token(buf: &[u8], i: &mut usize) -> Option<String> {
    while *i < buf.len() {
        let c = buf[*i];
        if c == b'#' {
            while *i < buf.len() && buf[*i] != b'\n' {
                *i += 1;
            }
        } else if c.is_ascii_whitespace() {
            *i += 1;
        } else {
            break;
        }
    }
    if *i >= buf.len() {
        return None;
    }
    let start = *i;
    while *i < buf.len() && !buf[*i].is_ascii_whitespace() {
        *i += 1;
    }
    Some(String::from_utf8_lossy(&buf[start..*i]).to_string())
}

fn read_number(buf: &[u8], i: &mut usize, missing: &'static str, bad: &'static str) -> io::Result<usize> {
    read_token(buf, i)
        .ok_or_else(|| invalid(missing))?
        .parse()
        .map_err(|_| invalid(bad))
}

/// Разобрать PGM P5 из памяти.
pub fn parse_p5(buf: &[u8]) -> io::Result<LumaImage> {
    let mut i = 0usize;
    let magic = read_token(buf, &mut i).ok_or_else(|| invalid("PGM: no magic"))?;
    if magic != "P5" {
        return Err(invalid("PGM: must be P5"));
    }
    let width = read_number(buf, &mut i, "PGM: no width", "PGM: bad width")?;
    let height = read_number(buf, &mut i, "PGM: no height", "PGM: bad height")?;
    let maxval = read_number(buf, &mut i, "PGM: no maxval", "PGM: bad maxval")?;
    if maxval != 255 {
        return Err(invalid("PGM: must be maxval=255"));
    }
    // ровно один пробельный символ после заголовка
    if i < buf.len() && buf[i].is_ascii_whitespace() {
        i += 1;
    }
    let data = buf[i..].to_vec();
    if data.len() != width * height {
        return Err(invalid("PGM: data size mismatch"));
    }
    Ok(LumaImage { data, width, height })
}

pub fn read_p5(path: impl AsRef<Path>) -> io::Result<LumaImage> {
    parse_p5(&fs::read(path)?)
}

pub fn write_p5(path: impl AsRef<Path>, img: &LumaImage) -> io::Result<()> {
    let mut f = fs::File::create(path)?;
    write!(f, "P5\n{} {}\n255\n", img.width, img.height)?;
    f.write_all(&img.data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_with_comment() {
        let mut buf = b"P5\n# demo\n3 2\n255\n".to_vec();
        buf.extend_from_slice(&[0, 128, 255, 255, 128, 0]);
        let img = parse_p5(&buf).expect("valid pgm");
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(img.row(1), &[255, 128, 0]);
    }

    #[test]
    fn rejects_wrong_magic_and_size() {
        assert!(parse_p5(b"P2\n1 1\n255\n\0").is_err());
        assert!(parse_p5(b"P5\n2 2\n255\n\0").is_err());
    }
}
