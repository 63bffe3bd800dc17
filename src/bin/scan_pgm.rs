use std::env;

use stripcode::api::Pipeline;
use stripcode::core::pgm::read_p5;
use stripcode::{decode_all, DecodeHints};

fn main() {
    env_logger::init();

    let mut path: Option<String> = None;
    let mut hints = DecodeHints::default();
    let mut adaptive = false;

    let mut args = env::args().skip(1);
    while let Some(a) = args.next() {
        match a.as_str() {
            "--rows" => {
                if let Some(v) = args.next() {
                    hints = hints.with_scan_rows(v.parse().unwrap_or(15));
                }
            }
            "--pure" => hints = hints.with_pure_barcode(true),
            "--adaptive" => adaptive = true,
            "--help" | "-h" => {
                print_help();
                return;
            }
            other => {
                if path.is_none() {
                    path = Some(other.to_string());
                } else {
                    eprintln!("Лишний аргумент: {other}");
                    print_help();
                    std::process::exit(2);
                }
            }
        }
    }

    let Some(path) = path else {
        print_help();
        std::process::exit(2);
    };

    let img = match read_p5(&path) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("Не удалось прочитать PGM: {e}");
            std::process::exit(1);
        }
    };

    let pipeline = Pipeline::builder()
        .hints(hints)
        .adaptive_binarization(adaptive)
        .build();
    let results = decode_all(&img, &pipeline);

    if results.is_empty() {
        println!("Ничего не распознано.");
    } else {
        for s in results {
            match s.extras.properties.get("row") {
                Some(row) => println!("{:?}: {}  (row={row})", s.symbology, s.text),
                None => println!("{:?}: {}", s.symbology, s.text),
            }
        }
    }
}

fn print_help() {
    eprintln!(
        r#"Использование:
  cargo run --bin scan_pgm -- <path.pgm> [--rows <N>] [--pure] [--adaptive]

Требуется PGM P5 (8-бит, maxval=255).
  --rows N     сколько строк сканировать для ITF
  --pure       изображение — выровненный и обрезанный QR
  --adaptive   адаптивная бинаризация вместо глобальной

Примеры:
  cargo run --bin scan_pgm -- ./test.pgm
  cargo run --bin scan_pgm -- ./qr.pgm --pure
"#
    );
}
