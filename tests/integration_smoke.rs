// tests/integration_smoke.rs
//
// Интеграционные «дымовые» тесты верхнего уровня: пайплайн целиком,
// от яркости до распознанного текста.

use stripcode::core::pgm::{read_p5, write_p5};
use stripcode::prelude::*;
use stripcode::qr::{render_luma, synthesize_qr_v1};
use stripcode::synthesize_itf_row;

fn itf_image(code: &str, unit: usize, height: usize) -> LumaImage {
    let row = synthesize_itf_row(code, unit).expect("valid ITF digits");
    let width = row.len();
    let data = (0..height)
        .flat_map(|_| row.iter().map(|&black| if black { 0u8 } else { 255u8 }))
        .collect();
    LumaImage { data, width, height }
}

#[test]
fn blank_image_decodes_nothing() {
    let img = LumaImage {
        data: vec![255; 32 * 32],
        width: 32,
        height: 32,
    };
    let pipe = PipelineBuilder::new().build();
    assert!(pipe.decode_all(&img).is_empty());
    assert_eq!(pipe.decode_first(&img), Err(DecodeError::NotFound));
}

#[test]
fn itf14_through_pipeline() {
    let img = itf_image("30712345000010", 2, 40);
    let pipe = PipelineBuilder::new().build();
    let found = pipe.decode_first(&img).expect("ITF-14 must decode");
    assert_eq!(found.symbology, Symbology::Itf);
    assert_eq!(found.text, "30712345000010");
    assert_eq!(found.points.len(), 2);
    assert!(found.extras.properties.contains_key("row"));
}

#[test]
fn itf_length_filter_reports_format() {
    let img = itf_image("123456", 3, 20);
    let pipe = PipelineBuilder::new()
        .enable_qr(false)
        .hints(DecodeHints::new().with_allowed_lengths(vec![14]))
        .build();
    assert_eq!(pipe.decode_first(&img), Err(DecodeError::Format));

    let pipe = PipelineBuilder::new()
        .enable_qr(false)
        .hints(DecodeHints::new().with_allowed_lengths(vec![6]))
        .build();
    assert_eq!(pipe.decode_first(&img).map(|s| s.text), Ok("123456".to_string()));
}

#[test]
fn pure_qr_through_pipeline() {
    let modules = synthesize_qr_v1("HELLO", EcLevel::L, 3).expect("fits");
    let img = render_luma(&modules, 4, 4);
    let pipe = PipelineBuilder::new()
        .hints(DecodeHints::new().with_pure_barcode(true))
        .build();

    let results = pipe.decode_all(&img);
    let qr = results
        .iter()
        .find(|s| s.symbology == Symbology::QrCode)
        .expect("no QR symbol");
    assert_eq!(qr.text, "HELLO");
    assert_eq!(qr.extras.ec_level.as_deref(), Some("L"));
}

#[test]
fn qr_without_pure_hint_needs_detector() {
    let modules = synthesize_qr_v1("HELLO", EcLevel::H, 0).expect("fits");
    let img = render_luma(&modules, 3, 4);
    let pipe = PipelineBuilder::new().enable_itf(false).build();
    assert_eq!(pipe.decode_first(&img), Err(DecodeError::NotFound));
}

#[test]
fn pgm_round_trip_then_decode() {
    let modules = synthesize_qr_v1("pgm", EcLevel::Q, 2).expect("fits");
    let img = render_luma(&modules, 3, 2);
    let path = std::env::temp_dir().join(format!("stripcode_smoke_{}.pgm", std::process::id()));
    write_p5(&path, &img).expect("write pgm");
    let back = read_p5(&path).expect("read pgm");
    let _ = std::fs::remove_file(&path);

    assert_eq!((back.width, back.height), (img.width, img.height));
    assert_eq!(back.data, img.data);

    let pipe = PipelineBuilder::new()
        .enable_itf(false)
        .hints(DecodeHints::new().with_pure_barcode(true))
        .build();
    assert_eq!(pipe.decode_first(&back).map(|s| s.text), Ok("pgm".to_string()));
}
