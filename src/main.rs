use std::env;
use std::io::Read;

use log::{error, info};
use recipe_post::{
    server, AppConfig, ExportGateway, GenerationResult, PostContent, PostGenerator,
};

const USAGE: &str = "Usage:
  recipe-post serve                 Run the extraction/generation endpoints
  recipe-post generate <file|->     Generate a post from recipe text
  recipe-post post-image <image>    Extract text from an image, then generate a post
  recipe-post extract <image>       Print the text found on a recipe image
  recipe-post export <post.json>    Send a post to the spreadsheet webhook";

fn read_text(source: &str) -> std::io::Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(source)
    }
}

fn print_post(result: GenerationResult) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        GenerationResult::Post(post) => println!("{}", serde_json::to_string_pretty(&post)?),
        GenerationResult::Text(text) => println!("{}", text),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);
    let argument = args.get(2).map(String::as_str);

    let config = AppConfig::load()?;

    let result: Result<(), Box<dyn std::error::Error>> = match (command, argument) {
        (Some("serve"), _) => server::serve(&config).await.map_err(Into::into),
        (Some("generate"), Some(source)) => {
            let text = read_text(source)?;
            match PostGenerator::builder().config(config).text(text).build().await {
                Ok(result) => print_post(result),
                Err(e) => Err(e.into()),
            }
        }
        (Some("post-image"), Some(path)) => {
            match PostGenerator::builder().config(config).image(path).build().await {
                Ok(result) => print_post(result),
                Err(e) => Err(e.into()),
            }
        }
        (Some("extract"), Some(path)) => {
            match PostGenerator::builder()
                .config(config)
                .image(path)
                .extract_only()
                .build()
                .await
            {
                Ok(result) => print_post(result),
                Err(e) => Err(e.into()),
            }
        }
        (Some("export"), Some(path)) => {
            let post: PostContent = serde_json::from_str(&read_text(path)?)?;
            let gateway = ExportGateway::new(config.webhook_url.clone());
            match gateway.export(&post).await {
                Ok(()) => {
                    info!("Post {} sent", post.number);
                    Ok(())
                }
                Err(e) => Err(e.into()),
            }
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}
