use std::env;

use stripcode::api::Pipeline;
use stripcode::core::pgm::write_p5;
use stripcode::qr::{render_luma, synthesize_qr_v1, EcLevel};
use stripcode::{decode_first, DecodeHints};

fn parse_ec(s: &str) -> Option<EcLevel> {
    match s {
        "L" | "l" => Some(EcLevel::L),
        "M" | "m" => Some(EcLevel::M),
        "Q" | "q" => Some(EcLevel::Q),
        "H" | "h" => Some(EcLevel::H),
        _ => None,
    }
}

fn main() {
    env_logger::init();

    let mut text = String::from("HELLO");
    let mut ec = EcLevel::L;
    let mut mask: u8 = 3;
    let mut unit: usize = 4;
    let mut write_pgm: Option<String> = None;

    // --text HELLO  --ec L|M|Q|H  --mask 0..7  --unit 4  --write-pgm out.pgm
    let mut args = env::args().skip(1);
    while let Some(a) = args.next() {
        match a.as_str() {
            "--text" => if let Some(v) = args.next() { text = v; },
            "--ec" => if let Some(v) = args.next() { ec = parse_ec(&v).unwrap_or(EcLevel::L); },
            "--mask" => if let Some(v) = args.next() { mask = v.parse().unwrap_or(3); },
            "--unit" => if let Some(v) = args.next() { unit = v.parse().unwrap_or(4); },
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

    let Some(modules) = synthesize_qr_v1(&text, ec, mask) else {
        eprintln!("Текст не влезает в QR v1-{ec} или маска вне 0..7");
        std::process::exit(2);
    };
    let img = render_luma(&modules, unit, 4);

    // картинка ровно вокруг символа: тихую зону срежет поиск углов
    let pipeline = Pipeline::builder()
        .enable_itf(false)
        .hints(DecodeHints::new().with_pure_barcode(true))
        .build();
    match decode_first(&img, &pipeline) {
        Ok(s) => println!(
            "{:?}: {}  (EC={})",
            s.symbology,
            s.text,
            s.extras.ec_level.as_deref().unwrap_or("?")
        ),
        Err(e) => println!("Ничего не распознано: {e}"),
    }

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
  cargo run --bin scan_qr_synth -- [--text <str>] [--ec L|M|Q|H] [--mask 0..7] [--unit <px>] [--write-pgm <file.pgm>]

Генерирует QR версии 1 (21×21, Byte mode) и читает его как «чистый» символ.

Примеры:
  cargo run --bin scan_qr_synth --
  cargo run --bin scan_qr_synth -- --text "Привет" --ec M --mask 5
"#
    );
}
