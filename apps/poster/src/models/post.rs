use image::RgbaImage;

use crate::models::candidate::Candidate;

/// A finished, ready-to-publish unit: the rendered or fetched bitmap, its caption,
/// and the candidate it was built from.
///
/// Built once per successful pipeline run and handed to a `Publisher`.
#[derive(Debug, Clone)]
pub struct Post {
    pub image: RgbaImage,
    pub caption: String,
    pub candidate: Candidate,
}
