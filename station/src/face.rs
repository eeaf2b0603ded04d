//! Drawing routines for the face of the display.
//!
//! The layout is fixed: a date across the top, a frame of four lines, the
//! weather icon on the left, temperature/humidity and CO2 to its right, and a
//! status phrase along the bottom. Everything that depends on the readings is
//! decided up front in a [`Scene`], which is then drawn onto a [`Canvas`].

use chrono::{DateTime, Local};
use embedded_graphics::Drawable;
use embedded_graphics::{
    geometry::Point,
    mono_font::{iso_8859_1::FONT_10X20, MonoTextStyle},
    primitives::{Line, Primitive, PrimitiveStyle},
    text::{Baseline, Text},
};

use crate::atmosphere::SensorReading;
use crate::canvas::{Canvas, TriColor};
use crate::icon::IconCategory;
use crate::resources::Resources;
use crate::Resolution;

/// Format of the date line, e.g. "2024/05/06 Mon".
pub const DATE_FORMAT: &str = "%Y/%m/%d %a";

/// Status phrase while the air is fine.
pub const NORMAL_PHRASE: &str = "Normal";

/// Status phrase once CO2 is over the threshold.
pub const WARNING_PHRASE: &str = "Ventilate now!";

const DATE_AT: Point = Point::new(19, 10);
const CLIMATE_AT: Point = Point::new(55, 34);
const CO2_AT: Point = Point::new(55, 57);
const STATUS_AT: Point = Point::new(19, 81);
const ICON_AT: Point = Point::new(11, 36);

/// Glyph drawn where the icon would be when there is none.
const PLACEHOLDER: &str = "?";

/// Frame around the readings: the vertical divider, then top, middle and bottom rules.
const FRAME: [(Point, Point); 4] = [
    (Point::new(52, 36), Point::new(52, 83)),
    (Point::new(14, 35), Point::new(240, 35)),
    (Point::new(57, 58), Point::new(240, 58)),
    (Point::new(14, 83), Point::new(240, 83)),
];

/// True iff the CO2 concentration calls for the warning look.
pub fn co2_alarm(co2: i64, threshold: i64) -> bool {
    co2 > threshold
}

/// Which background image the face is drawn on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Background {
    Simple,
    Warning,
}

impl Background {
    pub fn file_name(self) -> &'static str {
        match self {
            Background::Simple => "simple.png",
            Background::Warning => "warning.png",
        }
    }
}

/// A line of text at a fixed place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    pub text: String,
    pub position: Point,
    pub color: TriColor,
}

impl TextField {
    fn new(text: impl Into<String>, position: Point, color: TriColor) -> Self {
        TextField {
            text: text.into(),
            position,
            color,
        }
    }
}

/// What goes in the icon box.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IconSlot {
    Icon(IconCategory),
    Placeholder,
}

/// Everything the face shows, before it is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    pub background: Background,
    pub date: TextField,
    pub climate: TextField,
    pub co2: TextField,
    pub status: TextField,
    pub icon: IconSlot,
}

impl Scene {
    /// Decide the contents of the face.
    /// Without a sensor reading every value shows as a bare zero.
    pub fn plan(
        threshold: i64,
        time: DateTime<Local>,
        sensor: Option<&SensorReading>,
        icon: Option<IconCategory>,
    ) -> Self {
        let (climate, co2) = match sensor {
            Some(s) => (
                format!("T:{:?}°C  H:{}%", s.temperature, s.humidity),
                s.co2,
            ),
            None => ("T:0°C  H:0%".to_owned(), 0),
        };
        let alarm = co2_alarm(co2, threshold);
        let (background, status, co2_color) = if alarm {
            (
                Background::Warning,
                TextField::new(WARNING_PHRASE, STATUS_AT, TriColor::Red),
                TriColor::Red,
            )
        } else {
            (
                Background::Simple,
                TextField::new(NORMAL_PHRASE, STATUS_AT, TriColor::White),
                TriColor::White,
            )
        };

        Scene {
            background,
            date: TextField::new(
                time.format(DATE_FORMAT).to_string(),
                DATE_AT,
                TriColor::White,
            ),
            climate: TextField::new(climate, CLIMATE_AT, TriColor::White),
            co2: TextField::new(format!("CO2:{}ppm", co2), CO2_AT, co2_color),
            status,
            icon: icon.map_or(IconSlot::Placeholder, IconSlot::Icon),
        }
    }

    /// Text lines, in drawing order.
    pub fn texts(&self) -> [&TextField; 4] {
        [&self.date, &self.climate, &self.co2, &self.status]
    }

    /// Render the face onto a fresh canvas the size of the panel.
    pub fn draw(&self, resources: &Resources, resolution: Resolution) -> Canvas {
        let mut canvas =
            Canvas::from_background(resources.background(self.background), resolution.size());

        let stroke = PrimitiveStyle::with_stroke(TriColor::White, 1);
        for (start, end) in FRAME {
            Line::new(start, end)
                .into_styled(stroke)
                .draw(&mut canvas)
                .expect("infallible");
        }

        for field in self.texts() {
            draw_text(&mut canvas, field);
        }

        match self.icon {
            IconSlot::Icon(category) => match resources.icon(category) {
                Some(icon) => canvas.paste(&icon.image, ICON_AT, &icon.mask),
                None => {
                    tracing::warn!("no image for the {} icon", category);
                    draw_placeholder(&mut canvas);
                }
            },
            IconSlot::Placeholder => draw_placeholder(&mut canvas),
        }
        canvas
    }
}

fn draw_text(canvas: &mut Canvas, field: &TextField) {
    let style = MonoTextStyle::new(&FONT_10X20, field.color);
    Text::with_baseline(&field.text, field.position, style, Baseline::Top)
        .draw(canvas)
        .expect("infallible");
}

fn draw_placeholder(canvas: &mut Canvas) {
    draw_text(
        canvas,
        &TextField::new(PLACEHOLDER, ICON_AT, TriColor::Red),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::IndexedImage;
    use crate::resources::Icon;
    use chrono::TimeZone;
    use embedded_graphics::prelude::{OriginDimensions, Size};

    fn monday_morning() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 6, 7, 30, 0).unwrap()
    }

    fn reading(co2: i64) -> SensorReading {
        SensorReading {
            temperature: 21.5,
            humidity: 48,
            co2,
        }
    }

    fn resources() -> Resources {
        let size = Size::new(250, 122);
        let mut sun = vec![Some(TriColor::Red); 16];
        sun[0] = None;
        Resources::new(
            IndexedImage::filled(size, TriColor::Black),
            IndexedImage::filled(size, TriColor::Red),
        )
        .with_icon(
            IconCategory::Sun,
            Icon::new(IndexedImage::new(Size::new(4, 4), sun).unwrap()),
        )
    }

    #[test]
    fn plan_normal() {
        let scene = Scene::plan(1000, monday_morning(), Some(&reading(450)), Some(IconCategory::Sun));
        assert_eq!(scene.background, Background::Simple);
        assert_eq!(scene.date.text, "2024/05/06 Mon");
        assert_eq!(scene.climate.text, "T:21.5°C  H:48%");
        assert_eq!(scene.co2.text, "CO2:450ppm");
        assert_eq!(scene.co2.color, TriColor::White);
        assert_eq!(scene.status.text, NORMAL_PHRASE);
        assert_eq!(scene.status.color, TriColor::White);
        assert_eq!(scene.icon, IconSlot::Icon(IconCategory::Sun));
    }

    #[test]
    fn threshold_is_exclusive() {
        let at = Scene::plan(1000, monday_morning(), Some(&reading(1000)), None);
        assert_eq!(at.background, Background::Simple);
        assert_eq!(at.co2.color, TriColor::White);
        assert_eq!(at.status.text, NORMAL_PHRASE);

        let over = Scene::plan(1000, monday_morning(), Some(&reading(1001)), None);
        assert_eq!(over.background, Background::Warning);
        assert_eq!(over.co2.color, TriColor::Red);
        assert_eq!(over.status.text, WARNING_PHRASE);
        assert_eq!(over.status.color, TriColor::Red);
    }

    #[test]
    fn whole_temperature_keeps_decimal() {
        let sensor = SensorReading {
            temperature: 22.0,
            ..reading(450)
        };
        let scene = Scene::plan(1000, monday_morning(), Some(&sensor), None);
        assert_eq!(scene.climate.text, "T:22.0°C  H:48%");

        let zero = SensorReading::default();
        let scene = Scene::plan(1000, monday_morning(), Some(&zero), None);
        assert_eq!(scene.climate.text, "T:0.0°C  H:0%");
    }

    #[test]
    fn no_data_placeholders() {
        let scene = Scene::plan(1000, monday_morning(), None, None);
        assert_eq!(scene.climate.text, "T:0°C  H:0%");
        assert_eq!(scene.co2.text, "CO2:0ppm");
        assert_eq!(scene.icon, IconSlot::Placeholder);
        assert_eq!(scene.background, Background::Simple);
    }

    #[test]
    fn draw_frame_and_icon() {
        let scene = Scene::plan(1000, monday_morning(), Some(&reading(450)), Some(IconCategory::Sun));
        let canvas = scene.draw(&resources(), Resolution::PHAT_250X122);
        assert_eq!(canvas.size(), Size::new(250, 122));

        // Background.
        assert_eq!(canvas.pixel(Point::new(245, 110)), Some(TriColor::Black));
        // Frame lines.
        assert_eq!(canvas.pixel(Point::new(52, 60)), Some(TriColor::White));
        assert_eq!(canvas.pixel(Point::new(200, 35)), Some(TriColor::White));
        assert_eq!(canvas.pixel(Point::new(240, 83)), Some(TriColor::White));
        // Icon: the masked-out corner keeps the background.
        assert_eq!(canvas.pixel(ICON_AT), Some(TriColor::Black));
        assert_eq!(canvas.pixel(ICON_AT + Point::new(3, 3)), Some(TriColor::Red));
    }

    #[test]
    fn draw_warning_on_small_panel() {
        let scene = Scene::plan(1000, monday_morning(), Some(&reading(1500)), None);
        let canvas = scene.draw(&resources(), Resolution::PHAT_212X104);
        assert_eq!(canvas.size(), Size::new(212, 104));
        assert_eq!(canvas.pixel(Point::new(200, 100)), Some(TriColor::Red));
        // Rules are clipped at the panel edge.
        assert_eq!(canvas.pixel(Point::new(211, 58)), Some(TriColor::White));
    }

    #[test]
    fn draw_placeholder_glyph() {
        let scene = Scene::plan(1000, monday_morning(), None, None);
        let canvas = scene.draw(&resources(), Resolution::PHAT_250X122);
        let glyph = (0..10)
            .flat_map(|x| (0..20).map(move |y| ICON_AT + Point::new(x, y)))
            .filter(|p| canvas.pixel(*p) == Some(TriColor::Red))
            .count();
        assert!(glyph > 0, "placeholder should be drawn in red");
    }

    #[test]
    fn missing_icon_image_uses_placeholder() {
        let scene = Scene::plan(1000, monday_morning(), Some(&reading(450)), Some(IconCategory::Wind));
        let canvas = scene.draw(&resources(), Resolution::PHAT_250X122);
        let red = (0..10)
            .flat_map(|x| (0..20).map(move |y| ICON_AT + Point::new(x, y)))
            .filter(|p| canvas.pixel(*p) == Some(TriColor::Red))
            .count();
        assert!(red > 0);
    }
}
