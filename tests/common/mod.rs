#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Mutex;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use recipe_post::providers::{GenerativeModel, ModelRequest, Task};
use recipe_post::{PostContent, PostError};

pub fn sample_post() -> PostContent {
    PostContent {
        number: "12".to_string(),
        title: "Салат из свёклы с черносливом".to_string(),
        recipe: "Свёкла — 2 шт.\nЧернослив — 6 шт.\nОтварите свёклу до мягкости.\nНатрите и смешайте с черносливом.\nЗаправьте сметаной и сохраните рецепт!".to_string(),
        tip: "Запекайте свёклу в фольге, так она слаще.".to_string(),
        nutrition: "Ккал 135, Б 3 г, Ж 4 г, У 21 г".to_string(),
        diets: "диеты: 5, 10; «при гипертонии»".to_string(),
        image_prompt: "Формат 1080×1350 (4:5). Минимализм, дневной свет, салат крупным планом.".to_string(),
        hashtags: "#ВкусноПростоПолезно #щадящеепитание #вкуснополезно #диета5".to_string(),
    }
}

/// A small PNG page, large enough to need no resizing.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([240, 240, 230])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Model double answering each task with a canned reply.
pub struct FakeModel {
    pub extraction_reply: Result<String, String>,
    pub generation_reply: Result<String, String>,
    pub requests: Mutex<Vec<ModelRequest>>,
}

impl FakeModel {
    pub fn new(extraction_reply: &str, generation_reply: &str) -> Self {
        Self {
            extraction_reply: Ok(extraction_reply.to_string()),
            generation_reply: Ok(generation_reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            extraction_reply: Err(message.to_string()),
            generation_reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl GenerativeModel for FakeModel {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn generate(&self, request: ModelRequest) -> Result<String, PostError> {
        let reply = match request.task {
            Task::ExtractText => self.extraction_reply.clone(),
            Task::GeneratePost => self.generation_reply.clone(),
        };
        self.requests.lock().unwrap().push(request);
        reply.map_err(PostError::Gateway)
    }
}
