//! Image generation
//!
//! Builds a pollinations.ai render URL; the image itself is produced by the
//! provider when the browser fetches it. The reply carries a sentinel the
//! web client scans for to render the image inline.

use rand::Rng;

/// Marker prefix the frontend looks for in replies
pub const IMAGE_SENTINEL: &str = "IMAGE_GENERATED:";

pub struct ImageInput<'a> {
    pub prompt: &'a str,
    pub width: u32,
    pub height: u32,
}

/// Build the image URL and wrap it in the sentinel string
pub fn generate_image(input: ImageInput<'_>) -> String {
    let seed = rand::rng().random_range(1..=9999);
    generate_image_seeded(input, seed)
}

fn generate_image_seeded(input: ImageInput<'_>, seed: u32) -> String {
    let safe_prompt = urlencoding::encode(input.prompt);
    format!(
        "{} https://image.pollinations.ai/prompt/{}?nologo=true&seed={}&width={}&height={}",
        IMAGE_SENTINEL, safe_prompt, seed, input.width, input.height
    )
}
