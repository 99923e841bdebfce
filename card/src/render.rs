use ab_glyph::PxScale;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

use crate::errors::CardResult;
use crate::fonts::CardFont;
use crate::wrap::wrap_words;

pub const CARD_WIDTH: u32 = 1080;
pub const CARD_HEIGHT: u32 = 1350;
pub const PLACEHOLDER_TEXT: &str = "Your spark goes here.";

const TITLE: &str = "MuseMate Daily Spark";
const FOOTER: &str = "MuseMate Lite • Fellowship Edition";

const BG: Rgb<u8> = Rgb([12, 14, 23]); // #0C0E17
const BG2: Rgb<u8> = Rgb([36, 30, 78]); // #241E4E
const TEXT: Rgb<u8> = Rgb([234, 232, 227]); // #EAE8E3
const ACCENT: Rgb<u8> = Rgb([156, 140, 242]); // #9C8CF2

const MARGIN: u32 = 90;
const TITLE_Y: i32 = 70;
const BODY_Y: i32 = 220;
const LINE_HEIGHT: i32 = 60;
const FOOTER_OFFSET: u32 = 120;

const TITLE_SIZE: f32 = 52.0;
const BODY_SIZE: f32 = 44.0;
const FOOTER_SIZE: f32 = 28.0;

/// Renders sparks onto shareable PNG cards
#[derive(Debug)]
pub struct ShareCard {
    font: CardFont,
    width: u32,
    height: u32,
}

impl ShareCard {
    pub fn new(font: CardFont) -> Self {
        Self {
            font,
            width: CARD_WIDTH,
            height: CARD_HEIGHT,
        }
    }

    /// Uses `font_path` if it loads, else a system font, else the bundled one
    pub fn load(font_path: Option<&Path>) -> CardResult<Self> {
        Ok(Self::new(CardFont::discover(font_path)?))
    }

    /// Card drawn with the bundled font only
    pub fn bundled() -> CardResult<Self> {
        Ok(Self::new(CardFont::bundled()?))
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn font(&self) -> &CardFont {
        &self.font
    }

    /// PNG bytes for `text`. Blank text renders the placeholder.
    pub fn render(&self, text: &str) -> CardResult<Vec<u8>> {
        let mut img = gradient(self.width, self.height);
        let font = self.font.font();
        let body = match text.trim() {
            "" => PLACEHOLDER_TEXT,
            trimmed => trimmed,
        };

        draw_text_mut(
            &mut img,
            TEXT,
            MARGIN as i32,
            TITLE_Y,
            PxScale::from(TITLE_SIZE),
            font,
            TITLE,
        );

        let max_width = self.width.saturating_sub(2 * MARGIN) as f32;
        let lines = wrap_words(body, max_width, |line| {
            text_size(PxScale::from(BODY_SIZE), font, line).0 as f32
        });
        debug!(lines = lines.len(), "Rendering share card");

        let mut y = BODY_Y;
        for line in &lines {
            draw_text_mut(
                &mut img,
                TEXT,
                MARGIN as i32,
                y,
                PxScale::from(BODY_SIZE),
                font,
                line,
            );
            y += LINE_HEIGHT;
        }

        let footer_y = self.height.saturating_sub(FOOTER_OFFSET) as i32;
        draw_text_mut(
            &mut img,
            ACCENT,
            MARGIN as i32,
            footer_y,
            PxScale::from(FOOTER_SIZE),
            font,
            FOOTER,
        );

        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// Vertical blend from `BG` on the top row to `BG2` on the bottom row
fn gradient(width: u32, height: u32) -> RgbImage {
    let span = height.saturating_sub(1).max(1) as f32;
    RgbImage::from_fn(width, height, |_, y| {
        let t = y as f32 / span;
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb([mix(BG[0], BG2[0]), mix(BG[1], BG2[1]), mix(BG[2], BG2[2])])
    })
}
