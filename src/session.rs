//! Interactive session state: input mode, per-operation status and the
//! post being edited.
//!
//! Every gateway failure is caught here and stored as user-visible text on
//! the state of the operation that failed.

use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;

use crate::config::AppConfig;
use crate::editor;
use crate::gateways::Gateways;
use crate::media;
use crate::model::{PostContent, PostField, RequestState};

pub const EMPTY_TEXT_MESSAGE: &str = "Пожалуйста, введите текст рецепта.";
pub const EMPTY_EXTRACTED_TEXT_MESSAGE: &str =
    "Пожалуйста, загрузите изображение или дождитесь извлечения текста.";
pub const BUSY_MESSAGE: &str = "Дождитесь завершения текущего запроса.";

/// Where the recipe text comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Text,
    Image,
}

pub struct Session {
    gateways: Gateways,
    export_window: Duration,
    mode: InputMode,
    text: String,
    image_name: Option<String>,
    extracted_text: String,
    post: Option<PostContent>,
    extraction: RequestState,
    generation: RequestState,
    export: RequestState,
    export_settled_at: Option<Instant>,
}

impl Session {
    pub fn new(gateways: Gateways, export_window: Duration) -> Self {
        Self {
            gateways,
            export_window,
            mode: InputMode::default(),
            text: String::new(),
            image_name: None,
            extracted_text: String::new(),
            post: None,
            extraction: RequestState::Idle,
            generation: RequestState::Idle,
            export: RequestState::Idle,
            export_settled_at: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Gateways::from_config(config), config.export_status_window())
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selected_image(&self) -> Option<&str> {
        self.image_name.as_deref()
    }

    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }

    pub fn post(&self) -> Option<&PostContent> {
        self.post.as_ref()
    }

    pub fn extraction_state(&self) -> &RequestState {
        &self.extraction
    }

    pub fn generation_state(&self) -> &RequestState {
        &self.generation
    }

    /// Export status; a finished export reads as idle once the display
    /// window has passed.
    pub fn export_state(&self) -> RequestState {
        match self.export_settled_at {
            Some(at) if at.elapsed() >= self.export_window => RequestState::Idle,
            _ => self.export.clone(),
        }
    }

    /// Whether the submit control should be enabled
    pub fn can_submit(&self) -> bool {
        !self.extraction.is_in_flight() && !self.generation.is_in_flight()
    }

    pub fn can_export(&self) -> bool {
        self.post.is_some() && !self.export.is_in_flight()
    }

    /// Switch input mode, dropping the other mode's pending input and any error.
    pub fn switch_mode(&mut self, mode: InputMode) {
        debug!("Switching input mode to {:?}", mode);
        self.mode = mode;
        self.extracted_text.clear();
        self.clear_errors();
        match mode {
            InputMode::Text => self.image_name = None,
            InputMode::Image => self.text.clear(),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Replace the extracted text with the user's corrections.
    pub fn set_extracted_text(&mut self, text: impl Into<String>) {
        self.extracted_text = text.into();
    }

    /// Select an image and extract its text.
    ///
    /// A file that cannot be normalized is discarded from the selection.
    pub async fn select_image(&mut self, name: impl Into<String>, data: &[u8]) {
        if self.mode != InputMode::Image {
            self.switch_mode(InputMode::Image);
        }

        let name = name.into();
        self.extracted_text.clear();
        self.clear_errors();

        let payload = match media::normalize(data) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Discarding image {}: {}", name, e);
                self.image_name = None;
                self.extraction = RequestState::Error(e.user_message());
                return;
            }
        };

        self.image_name = Some(name);
        self.extraction = RequestState::InFlight;
        self.extraction = match self.gateways.extraction.extract_text(&payload).await {
            Ok(text) => {
                self.extracted_text = text;
                RequestState::Success
            }
            Err(e) => {
                warn!("Text extraction failed: {}", e);
                RequestState::Error(e.user_message())
            }
        };
    }

    /// Generate a post from the current mode's text.
    ///
    /// Empty input is refused locally without contacting any gateway.
    pub async fn submit(&mut self) {
        if !self.can_submit() {
            self.generation = RequestState::Error(BUSY_MESSAGE.to_string());
            return;
        }

        let (source, empty_message) = match self.mode {
            InputMode::Text => (self.text.clone(), EMPTY_TEXT_MESSAGE),
            InputMode::Image => (self.extracted_text.clone(), EMPTY_EXTRACTED_TEXT_MESSAGE),
        };
        if source.trim().is_empty() {
            self.generation = RequestState::Error(empty_message.to_string());
            return;
        }

        self.generation = RequestState::InFlight;
        self.post = None;
        self.export = RequestState::Idle;
        self.export_settled_at = None;

        self.generation = match self.gateways.generation.generate_post(&source, &[]).await {
            Ok(post) => {
                self.post = Some(post);
                RequestState::Success
            }
            Err(e) => {
                warn!("Post generation failed: {}", e);
                RequestState::Error(e.user_message())
            }
        };
    }

    /// Apply a user edit to the current post; ignored when there is none.
    pub fn edit_field(&mut self, field: PostField, value: impl Into<String>) {
        if let Some(post) = self.post.take() {
            self.post = Some(editor::set_field(post, field, value));
        }
    }

    /// Send the current post to the spreadsheet webhook.
    pub async fn export(&mut self) {
        let Some(post) = self.post.clone() else {
            return;
        };

        self.export = RequestState::InFlight;
        self.export_settled_at = None;

        self.export = match self.gateways.export.export(&post).await {
            Ok(()) => RequestState::Success,
            Err(e) => {
                warn!("Export failed: {}", e);
                RequestState::Error(e.user_message())
            }
        };
        self.export_settled_at = Some(Instant::now());
    }

    fn clear_errors(&mut self) {
        if self.extraction.error_message().is_some() {
            self.extraction = RequestState::Idle;
        }
        if self.generation.error_message().is_some() {
            self.generation = RequestState::Idle;
        }
    }
}
