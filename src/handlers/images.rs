//! Image proxy: fetches catalog images from the asset origin and re-encodes
//! them as PNG. Anything that cannot be fetched or decoded is answered with a
//! generated placeholder so product cards never show a broken image.

use std::io::Cursor;
use std::time::Duration;

use actix_web::{HttpResponse, web, web::Bytes};
use image::{ImageFormat, Rgb, RgbImage};

use crate::AppState;

const PLACEHOLDER_SIZE: u32 = 300;
const PLACEHOLDER_COLOR: Rgb<u8> = Rgb([229, 231, 235]);
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct ImageProxy {
    http: reqwest::Client,
    asset_base_url: String,
    placeholder: Bytes,
}

impl ImageProxy {
    pub fn new(asset_base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            http,
            asset_base_url: asset_base_url.into().trim_end_matches('/').to_string(),
            placeholder: Bytes::from(placeholder_png(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE)?),
        })
    }

    pub fn placeholder(&self) -> Bytes {
        self.placeholder.clone()
    }

    pub async fn fetch_png(&self, rel_path: &str) -> anyhow::Result<Vec<u8>> {
        let target_url = format!("{}/{}", self.asset_base_url, rel_path.trim_start_matches('/'));

        let response = self.http.get(&target_url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        let img = image::load_from_memory(&bytes)?;
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }
}

pub fn placeholder_png(width: u32, height: u32) -> Result<Vec<u8>, image::ImageError> {
    let img = RgbImage::from_pixel(width, height, PLACEHOLDER_COLOR);
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

fn png(body: impl Into<Bytes>) -> HttpResponse {
    HttpResponse::Ok().content_type("image/png").body(body.into())
}

pub async fn placeholder(state: web::Data<AppState>) -> HttpResponse {
    png(state.images.placeholder())
}

pub async fn proxy_image(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let rel_path = path.into_inner();

    match state.images.fetch_png(&rel_path).await {
        Ok(bytes) => png(bytes),
        Err(err) => {
            tracing::warn!(path = %rel_path, error = %err, "Image unavailable, serving placeholder");
            png(state.images.placeholder())
        }
    }
}
