//! Presentation (`.pptx`) support.
//!
//! A [`Presentation`] holds slides built from rectangles with text,
//! pictures and charts. Every package carries one slide master, one blank
//! layout and a theme whose color scheme can be changed.
//!
//! # Examples
//!
//! ```rust,no_run
//! use docforge::common::Rgb;
//! use docforge::ooxml::docx::Justification;
//! use docforge::ooxml::pptx::Presentation;
//!
//! let mut pres = Presentation::new();
//! let slide = pres.slide_mut(0)?;
//! slide.set_background_color(Rgb::new(255, 244, 240));
//! let paragraph = slide.add_text_shape(720_000, 720_000, 10_800_000, 720_000).paragraph_mut(0)?;
//! paragraph.set_justification(Justification::Center);
//! paragraph.add_text("Price Type Report").set_font_size(80).set_font_family("Tahoma");
//! pres.save("result.pptx")?;
//! # Ok::<(), docforge::ooxml::OoxmlError>(())
//! ```

pub mod presentation;
pub mod shape;
pub mod slide;
mod template;

pub use presentation::{
    DEFAULT_SLIDE_HEIGHT, DEFAULT_SLIDE_WIDTH, Presentation, WIDESCREEN_SLIDE_WIDTH,
};
pub use shape::{Frame, Shape, ShapeParagraph, TextAnchor, TextRun};
pub use slide::{ChartFrame, Picture, Slide, SlideBackground, SlideObject};
pub use template::{ColorScheme, SchemeColor};
