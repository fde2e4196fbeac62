//! FFmpeg filter and lavfi source builders.

use std::path::Path;

use sclip_models::{AspectClass, AudioProfile};

/// Geometry normalization for an aspect class.
///
/// Standard fits inside 1920x1080 with letterbox padding. Tall crops the
/// source to a centered square, scales it to 1080x1080, then pads
/// vertically to 1080x1920.
pub fn scale_filter(aspect: AspectClass) -> String {
    let (w, h) = aspect.resolution();
    match aspect {
        AspectClass::Standard => format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:black"
        ),
        AspectClass::Tall => format!(
            "crop='min(iw,ih)':'min(iw,ih)',scale={w}:{w},\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:black"
        ),
    }
}

/// Burn-in filter for an ASS overlay file.
pub fn ass_filter(overlay: &Path) -> String {
    format!("ass='{}'", escape_filter_path(overlay))
}

/// Full video filter chain: geometry plus optional subtitle burn-in.
pub fn video_chain(aspect: AspectClass, overlay: Option<&Path>) -> String {
    match overlay {
        Some(path) => format!("{},{}", scale_filter(aspect), ass_filter(path)),
        None => scale_filter(aspect),
    }
}

/// lavfi source for a solid black frame sized to the aspect class.
pub fn black_source(aspect: AspectClass, duration: f64) -> String {
    let (w, h) = aspect.resolution();
    format!("color=c=black:s={w}x{h}:d={duration}")
}

/// lavfi source for silence at the given audio profile.
pub fn silence_source(audio: &AudioProfile) -> String {
    let layout = if audio.channels == 1 { "mono" } else { "stereo" };
    format!(
        "anullsrc=channel_layout={layout}:sample_rate={rate}",
        rate = audio.sample_rate
    )
}

/// Escape a path for use inside a quoted ffmpeg filter argument.
fn escape_filter_path(path: &Path) -> String {
    path.display()
        .to_string()
        .replace('\\', "/")
        .replace('\'', "'\\''")
        .replace(':', "\\:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sclip_models::EncodingProfile;

    #[test]
    fn test_standard_scale() {
        let f = scale_filter(AspectClass::Standard);
        assert!(f.starts_with("scale=1920:1080"));
        assert!(f.contains("pad=1920:1080"));
    }

    #[test]
    fn test_tall_crops_square_then_pads() {
        let f = scale_filter(AspectClass::Tall);
        assert!(f.starts_with("crop='min(iw,ih)':'min(iw,ih)'"));
        assert!(f.contains("scale=1080:1080"));
        assert!(f.contains("pad=1080:1920"));
    }

    #[test]
    fn test_video_chain_with_overlay() {
        let chain = video_chain(AspectClass::Standard, Some(Path::new("/tmp/overlay.ass")));
        assert!(chain.ends_with("ass='/tmp/overlay.ass'"));
    }

    #[test]
    fn test_silence_source() {
        let audio = EncodingProfile::standard(AspectClass::Standard).audio;
        assert_eq!(
            silence_source(&audio),
            "anullsrc=channel_layout=stereo:sample_rate=48000"
        );
    }

    #[test]
    fn test_path_escaping() {
        let f = ass_filter(Path::new("/tmp/it's.ass"));
        assert!(f.contains("'\\''"));
    }
}
