//! Picture slides with captions (`.pptx`).
use std::path::PathBuf;

use crate::builders::{TextStyle, add_shape_text};
use crate::common::Rgb;
use crate::config::RunConfig;
use crate::error::Result;
use crate::ooxml::docx::Justification;
use crate::ooxml::pptx::{DEFAULT_SLIDE_HEIGHT, DEFAULT_SLIDE_WIDTH, Presentation, Slide};
use crate::session::{DocumentKind, DocumentSession};

const FONT: &str = "Georgia";

/// A borderless text box; each line is `(text, size, bold)`.
struct Caption {
    x: i64,
    y: i64,
    width: i64,
    height: i64,
    justification: Justification,
    lines: &'static [(&'static str, u32, bool)],
}

struct PictureSlide {
    image: &'static str,
    captions: &'static [Caption],
}

const SLIDES: [PictureSlide; 4] = [
    PictureSlide {
        image: "gun.png",
        captions: &[Caption {
            x: 608_400,
            y: 1_267_200,
            width: 8_056_800,
            height: 3_020_400,
            justification: Justification::Left,
            lines: &[("How They", 160, true), ("Throw Out", 132, false), ("a Challenge", 132, false)],
        }],
    },
    PictureSlide {
        image: "axe.png",
        captions: &[
            Caption {
                x: 1_764_000,
                y: 1_191_600,
                width: 6_904_800,
                height: 1_724_400,
                justification: Justification::Right,
                lines: &[("American Indians ", 110, true), ("(XVII century)", 94, false)],
            },
            Caption {
                x: 3_834_000,
                y: 3_888_000,
                width: 4_986_000,
                height: 2_419_200,
                justification: Justification::Right,
                lines: &[("put a tomahawk on the ground in the ", 84, false), ("rival's camp", 84, false)],
            },
        ],
    },
    PictureSlide {
        image: "knight.png",
        captions: &[
            Caption {
                x: 1_764_000,
                y: 1_191_600,
                width: 6_904_800,
                height: 1_724_400,
                justification: Justification::Right,
                lines: &[("European Knights", 110, true), (" (XII-XVI centuries)", 94, false)],
            },
            Caption {
                x: 3_834_000,
                y: 3_888_000,
                width: 4_986_000,
                height: 2_419_200,
                justification: Justification::Right,
                lines: &[("threw a glove", 84, false), ("in the rival's face", 84, false)],
            },
        ],
    },
    PictureSlide {
        image: "sky.png",
        captions: &[Caption {
            x: 630_000,
            y: 1_357_200,
            width: 7_887_600,
            height: 3_063_600,
            justification: Justification::Center,
            lines: &[("docforge", 176, false), ("stands for Peace", 132, false)],
        }],
    },
];

pub fn generate(config: &RunConfig) -> Result<PathBuf> {
    let images: Vec<Vec<u8>> = SLIDES
        .iter()
        .map(|slide| super::load_image(config, slide.image))
        .collect();
    let mut session = DocumentSession::create(DocumentKind::Presentation);
    build(session.presentation_mut()?, images)?;
    super::finish(session, config)
}

/// One slide per entry of `images`, in the order of the picture slides.
pub fn build(pres: &mut Presentation, images: Vec<Vec<u8>>) -> Result<()> {
    pres.set_slide_size(DEFAULT_SLIDE_WIDTH, DEFAULT_SLIDE_HEIGHT);
    for (layout, image) in SLIDES.iter().zip(images) {
        let slide = pres.add_slide();
        slide.set_background_image(image)?;
        for caption in layout.captions {
            add_caption(slide, caption);
        }
    }
    // the blank slide a new presentation starts with
    pres.remove_slide(0)?;
    Ok(())
}

fn add_caption(slide: &mut Slide, caption: &Caption) {
    let shape = slide.add_text_shape(caption.x, caption.y, caption.width, caption.height);
    shape.set_fill(None).set_outline(None).clear();
    for &(text, size, bold) in caption.lines {
        let mut style = TextStyle::sized(size)
            .with_font(FONT)
            .with_color(Rgb::WHITE)
            .with_justification(caption.justification);
        style.bold = bold;
        let paragraph = shape.add_paragraph();
        paragraph.set_spacing_before(0).set_spacing_after(0);
        add_shape_text(paragraph, text, &style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::picture::PLACEHOLDER_PNG;
    use crate::ooxml::pptx::SlideBackground;
    use crate::reports::testing::sandbox;

    fn built() -> Presentation {
        let mut pres = Presentation::new();
        build(&mut pres, vec![PLACEHOLDER_PNG.to_vec(); SLIDES.len()]).unwrap();
        pres
    }

    #[test]
    fn test_every_slide_has_a_picture_background() {
        let pres = built();
        assert_eq!(pres.slide_count(), 4);
        for slide in pres.slides() {
            assert!(matches!(slide.background(), Some(SlideBackground::Image { .. })));
        }
        assert_eq!(pres.slide_size(), (9_144_000, 6_858_000));
    }

    #[test]
    fn test_captions() {
        let pres = built();
        let first: Vec<String> = pres.slides()[0].shapes().map(|s| s.text()).collect();
        assert_eq!(first, ["How They\nThrow Out\na Challenge"]);

        let knight: Vec<_> = pres.slides()[2].shapes().collect();
        assert_eq!(knight.len(), 2);
        assert_eq!(knight[1].frame().x, 3_834_000);
        assert_eq!(knight[1].paragraphs().len(), 2);
    }

    #[test]
    fn test_generate() {
        let (_dir, config) = sandbox();
        std::fs::remove_file(config.image_file("sky.png")).unwrap();
        let output = generate(&config).unwrap();
        let file = std::fs::File::open(output).unwrap();
        let archive = zip::ZipArchive::new(file).unwrap();
        let slides = archive
            .file_names()
            .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
            .count();
        assert_eq!(slides, 4);
    }
}
