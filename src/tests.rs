use crate::heightmap::{derive, normalize, value_range, weighted_raw};
use crate::histogram::summarize;
use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_image(rng: &mut StdRng) -> RgbImage {
    let width = rng.gen_range(1..=24);
    let height = rng.gen_range(1..=24);
    RgbImage::from_fn(width, height, |_, _| Rgb(rng.gen()))
}

#[test]
fn test_full_range_stretch_on_random_images() {
    let mut rng = StdRng::seed_from_u64(0x11f0);
    for _ in 0..200 {
        let img = random_image(&mut rng);
        let raw = weighted_raw(&img);
        let hm = derive(&img);
        assert_eq!(hm.dimensions(), img.dimensions());

        match value_range(&raw) {
            Some((lo, hi)) if lo != hi => assert_eq!(value_range(&hm), Some((0, 255))),
            _ => assert!(hm.pixels().all(|p| p[0] == 0)),
        }
    }
}

#[test]
fn test_histogram_total_matches_pixel_count() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let img = random_image(&mut rng);
        let hist = summarize(&derive(&img));
        assert_eq!(hist.total(), img.width() as u64 * img.height() as u64);
    }
}

#[test]
fn test_renormalizing_is_a_no_op() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..100 {
        let hm = derive(&random_image(&mut rng));
        assert_eq!(normalize(&hm), hm);
    }
}

#[test]
fn test_blue_only_images_are_flat() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..50 {
        let mut img = random_image(&mut rng);
        for px in img.pixels_mut() {
            px[0] = 0;
            px[1] = 0;
        }
        let hm = derive(&img);
        assert!(hm.pixels().all(|p| p[0] == 0));
        assert_eq!(summarize(&hm).count(0), hm.width() as u64 * hm.height() as u64);
    }
}

#[test]
fn test_black_image_histogram() {
    let hm = derive(&RgbImage::new(6, 5));
    let hist = summarize(&hm);
    assert_eq!(hist.count(0), 30);
    assert_eq!(hist.nonzero_buckets(), 1);
}

mod http {
    use crate::codec;
    use crate::server::{router, HEIGHTMAP_FILENAME, HISTOGRAM_FILENAME};
    use crate::settings::Settings;
    use axum::body::{Body, Bytes};
    use axum::http::{header, HeaderMap, Request, StatusCode};
    use image::{ColorType, Rgb, RgbImage};
    use tower::ServiceExt;

    const BOUNDARY: &str = "lithocolor-test-boundary";

    fn form(field: &str, content: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"photo.png\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn sample_png() -> Vec<u8> {
        let img = RgbImage::from_fn(9, 5, |x, y| Rgb([(x * 28) as u8, (y * 50) as u8, 90]));
        codec::encode_rgb_png(&img).unwrap()
    }

    async fn send(settings: Settings, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = router(settings).oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body)
    }

    async fn post_form(path: &str, body: Vec<u8>) -> (StatusCode, HeaderMap, Bytes) {
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap();
        send(Settings::default(), request).await
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let request = Request::get("/").body(Body::empty()).unwrap();
        let (status, headers, body) = send(Settings::default(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
        assert!(String::from_utf8_lossy(&body).contains(r#"name="image""#));
    }

    #[tokio::test]
    async fn test_generate_without_image_field() {
        let (status, _, body) = post_form("/generate", form("photo", &sample_png())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(&body[..], b"No file uploaded");
    }

    #[tokio::test]
    async fn test_text_field_named_image_is_not_a_file() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        );
        for path in ["/generate", "/download/heightmap", "/download/histogram"] {
            let (status, _, response) = post_form(path, body.clone().into_bytes()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
            assert_eq!(&response[..], b"No file uploaded");
        }
    }

    #[tokio::test]
    async fn test_file_found_after_text_field() {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"\r\n\r\nhello\r\n"
        )
        .into_bytes();
        body.extend_from_slice(&form("image", &sample_png()));
        let (status, headers, _) = post_form("/download/heightmap", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    }

    #[tokio::test]
    async fn test_non_multipart_body_counts_as_missing() {
        for path in ["/generate", "/download/heightmap", "/download/histogram"] {
            let request = Request::post(path).body(Body::from("image=1")).unwrap();
            let (status, _, body) = send(Settings::default(), request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
            assert_eq!(&body[..], b"No file uploaded");
        }
    }

    #[tokio::test]
    async fn test_generate_embeds_three_images() {
        let (status, _, body) = post_form("/generate", form("image", &sample_png())).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(html.matches("data:image/png;base64,").count(), 3);
        assert!(html.contains("9&times;5 px"));
    }

    #[tokio::test]
    async fn test_download_heightmap() {
        let (status, headers, body) = post_form("/download/heightmap", form("image", &sample_png())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains(HEIGHTMAP_FILENAME));

        let decoded = image::load_from_memory(&body).unwrap();
        assert_eq!(decoded.color(), ColorType::L8);
        assert_eq!((decoded.width(), decoded.height()), (9, 5));
    }

    #[tokio::test]
    async fn test_download_histogram() {
        let (status, headers, body) = post_form("/download/histogram", form("image", &sample_png())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        assert!(headers[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains(HISTOGRAM_FILENAME));

        let decoded = image::load_from_memory(&body).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1280, 960));
    }

    #[tokio::test]
    async fn test_undecodable_upload_is_client_error() {
        let (status, _, body) = post_form("/download/heightmap", form("image", b"not a picture")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8_lossy(&body).contains("Image decoding error"));
    }

    #[tokio::test]
    async fn test_empty_upload_is_client_error() {
        let (status, _, _) = post_form("/generate", form("image", b"")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let settings = Settings {
            max_upload_bytes: 64,
            ..Settings::default()
        };
        let request = Request::post("/download/heightmap")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(form("image", &[0u8; 4096])))
            .unwrap();
        let (status, _, _) = send(settings, request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_uniform_upload_still_succeeds() {
        let png = codec::encode_rgb_png(&RgbImage::from_pixel(2, 2, Rgb([0, 0, 255]))).unwrap();
        let (status, _, body) = post_form("/download/heightmap", form("image", &png)).await;
        assert_eq!(status, StatusCode::OK);
        let decoded = image::load_from_memory(&body).unwrap().to_luma8();
        assert!(decoded.pixels().all(|p| p[0] == 0));
    }
}
