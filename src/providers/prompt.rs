use serde_json::{json, Map, Value};

use crate::model::PostField;

/// The system instruction for post generation.
///
/// Loaded from `prompt.txt` at compile time so the Russian copy can be
/// edited without dealing with Rust string syntax.
pub const SYSTEM_PROMPT: &str = include_str!("prompt.txt");

/// Instruction sent alongside an image when only its text is wanted.
pub const EXTRACTION_INSTRUCTION: &str =
    "Извлеки весь текст, который видишь на изображении. Не добавляй ничего от себя, только текст с картинки.";

/// Hashtags every post must carry, besides the diet-number one.
pub const MANDATORY_HASHTAGS: [&str; 3] =
    ["#ВкусноПростоПолезно", "#щадящеепитание", "#вкуснополезно"];

/// Mandatory hashtags absent from a post's hashtag line.
pub fn missing_hashtags(hashtags: &str) -> Vec<&'static str> {
    MANDATORY_HASHTAGS
        .into_iter()
        .filter(|tag| !hashtags.split_whitespace().any(|word| word == *tag))
        .collect()
}

/// Key wrapping the post object in the model's reply.
pub const POST_CONTENT_KEY: &str = "post_content";

const GENERATION_PREAMBLE: &str =
    "Вот текст и/или скриншот рецепта. Извлеки из него номер рецепта и все остальные данные для поста.";

/// Wrap the caller's recipe text in the fixed generation instruction.
pub fn build_generation_text(text: &str) -> String {
    format!("{}\n\n{}", GENERATION_PREAMBLE, text)
}

fn field_description(field: PostField) -> &'static str {
    match field {
        PostField::Number => "Номер рецепта из источника.",
        PostField::Title => "Название рецепта.",
        PostField::Recipe => {
            "Готовый текст поста, включающий ингредиенты и шаги приготовления."
        }
        PostField::Tip => "Совет или лайфхак по приготовлению.",
        PostField::Nutrition => {
            "Рассчитанный КБЖУ на одну порцию. Обязательно должен содержать числовые значения, а не текст 'по запросу'."
        }
        PostField::Diets => "Номера диет и медицинские показания.",
        PostField::ImagePrompt => "Промпт для генерации визуала для поста в инстаграм.",
        PostField::Hashtags => "Хэштеги для поста.",
    }
}

/// Response schema declared to the model: `{post_content: {eight string fields}}`,
/// every field required.
pub fn post_response_schema() -> Value {
    let mut properties = Map::new();
    for field in PostField::ALL {
        properties.insert(
            field.key().to_string(),
            json!({ "type": "STRING", "description": field_description(field) }),
        );
    }
    let required: Vec<&str> = PostField::ALL.iter().map(|f| f.key()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            POST_CONTENT_KEY: {
                "type": "OBJECT",
                "properties": properties,
                "required": required,
            }
        },
        "required": [POST_CONTENT_KEY],
    })
}
