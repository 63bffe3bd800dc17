use std::env;

use stripcode::core::pgm::write_p5;
use stripcode::{decode_all, synthesize_itf_row, LumaImage};
use stripcode::api::Pipeline;

fn main() {
    env_logger::init();

    let mut code = String::from("30712345000010"); // ITF-14 по умолчанию
    let mut unit: usize = 2; // ширина узкого модуля в пикселях
    let mut height: usize = 64; // высота картинки
    let mut write_pgm: Option<String> = None;

    // Примитивный парсер аргументов:
    // --code 30712345000010  --unit 2  --height 64  --write-pgm out.pgm
    let mut args = env::args().skip(1);
    while let Some(a) = args.next() {
        match a.as_str() {
            "--code" => if let Some(v) = args.next() { code = v; },
            "--unit" => if let Some(v) = args.next() { unit = v.parse().unwrap_or(2); },
            "--height" => if let Some(v) = args.next() { height = v.parse().unwrap_or(64); },
            "--write-pgm" => if let Some(v) = args.next() { write_pgm = Some(v); },
            "--help" | "-h" => {
                print_help();
                return;
            }
            other => {
                eprintln!("Неизвестный аргумент: {other}");
                print_help();
                std::process::exit(2);
            }
        }
    }

    // Синтетическая строка пикселей (чёрный=0, белый=255), повторённая height раз
    let Some(row) = synthesize_itf_row(&code, unit) else {
        eprintln!("Код должен состоять из чётного числа цифр: {code}");
        std::process::exit(2);
    };
    let width = row.len();
    let mut data = Vec::with_capacity(width * height);
    for _ in 0..height {
        data.extend(row.iter().map(|&black| if black { 0u8 } else { 255u8 }));
    }
    let img = LumaImage { data, width, height };

    let pipeline = Pipeline::builder().enable_qr(false).build();
    let results = decode_all(&img, &pipeline);

    if results.is_empty() {
        println!("Ничего не распознано :(");
    } else {
        for s in results {
            println!("{:?}: {}", s.symbology, s.text);
        }
    }

    // По необходимости сохраним PGM (P5)
    if let Some(path) = write_pgm {
        if let Err(e) = write_p5(&path, &img) {
            eprintln!("Ошибка записи PGM: {e}");
        } else {
            println!("PGM сохранён: {path}");
        }
    }
}

fn print_help() {
    eprintln!(
r#"Использование:
  cargo run --bin scan_synthetic -- [--code <digits>] [--unit <px>] [--height <px>] [--write-pgm <file.pgm>]

По умолчанию генерируется ITF-14 30712345000010 с unit=2 и height=64.
Длина кода должна быть чётной и входить в список ITF (6, 8, 10, 12, 14, 16, 18, 20, 24, 44).

Примеры:
  cargo run --bin scan_synthetic --
  cargo run --bin scan_synthetic -- --code 123456
  RUST_LOG=debug cargo run --bin scan_synthetic -- --write-pgm out.pgm
"#
    );
}
