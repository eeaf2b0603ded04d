//! Panel stand-in that writes the face to a PNG.

use std::path::{Path, PathBuf};

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::Rgb888,
    Pixel,
};
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay};

use crate::{
    canvas::{Canvas, TriColor},
    check_size, Panel, PanelError, Resolution,
};

/// Width of the border drawn around the active area.
const BORDER: u32 = 2;

impl From<TriColor> for Rgb888 {
    fn from(color: TriColor) -> Self {
        let [r, g, b] = color.rgb();
        Rgb888::new(r, g, b)
    }
}

pub struct SimPanel {
    resolution: Resolution,
    display: SimulatorDisplay<Rgb888>,
    border: TriColor,
    staged: Option<Canvas>,
    output: PathBuf,
    scale: u32,
}

impl SimPanel {
    /// A simulated panel that writes each shown face to `output`.
    pub fn new(resolution: Resolution, output: impl AsRef<Path>) -> Self {
        let size = resolution.size() + Size::new(2 * BORDER, 2 * BORDER);
        SimPanel {
            resolution,
            display: SimulatorDisplay::new(size),
            border: TriColor::default(),
            staged: None,
            output: output.as_ref().to_owned(),
            scale: 1,
        }
    }

    /// Scale each panel pixel up in the screenshot.
    pub fn with_scale(self, scale: u32) -> Self {
        SimPanel {
            scale: scale.max(1),
            ..self
        }
    }

    /// Redraw the border and the staged face.
    fn redraw(&mut self) {
        self.display
            .clear(self.border.into())
            .expect("infallible");
        if let Some(canvas) = &self.staged {
            let width = canvas.size().width as i32;
            let offset = Point::new(BORDER as i32, BORDER as i32);
            let pixels = canvas.pixels().iter().enumerate().map(|(i, color)| {
                let i = i as i32;
                Pixel(Point::new(i % width, i / width) + offset, (*color).into())
            });
            self.display.draw_iter(pixels).expect("infallible");
        }
    }

    /// Render the current state without writing it anywhere.
    pub fn screenshot(&mut self) -> embedded_graphics_simulator::OutputImage<Rgb888> {
        self.redraw();
        let settings = OutputSettingsBuilder::new().scale(self.scale).build();
        self.display.to_rgb_output_image(&settings)
    }
}

impl Panel for SimPanel {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn set_border(&mut self, color: TriColor) {
        self.border = color;
    }

    fn set_image(&mut self, canvas: &Canvas) -> Result<(), PanelError> {
        check_size(canvas, self.resolution)?;
        self.staged = Some(canvas.clone());
        Ok(())
    }

    fn show(&mut self) -> Result<(), PanelError> {
        let image = self.screenshot();
        image
            .save_png(&self.output)
            .map_err(|e| PanelError::Driver(format!("writing {}: {}", self.output.display(), e)))?;
        tracing::info!("wrote face to {}", self.output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::Drawable;

    #[test]
    fn writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        let mut panel = SimPanel::new(Resolution::PHAT_212X104, &path);

        let mut canvas = Canvas::new(Resolution::PHAT_212X104.size());
        Pixel(Point::new(0, 0), TriColor::Red)
            .draw(&mut canvas)
            .expect("infallible");
        panel.set_border(TriColor::Black);
        panel.set_image(&canvas).unwrap();
        panel.show().unwrap();

        let png = image::open(&path).expect("should be a png").into_rgb8();
        assert_eq!((png.width(), png.height()), (216, 108));
        assert_eq!(png.get_pixel(0, 0).0, TriColor::Black.rgb());
        assert_eq!(png.get_pixel(2, 2).0, TriColor::Red.rgb());
        assert_eq!(png.get_pixel(3, 2).0, TriColor::White.rgb());
    }

    #[test]
    fn rejects_wrong_size() {
        let mut panel = SimPanel::new(Resolution::PHAT_250X122, "unused.png");
        let canvas = Canvas::new(Resolution::PHAT_212X104.size());
        assert!(matches!(
            panel.set_image(&canvas),
            Err(PanelError::SizeMismatch(..))
        ));
    }

    #[test]
    fn scaled_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        let mut panel = SimPanel::new(Resolution::PHAT_212X104, &path).with_scale(2);
        panel
            .set_image(&Canvas::new(Resolution::PHAT_212X104.size()))
            .unwrap();
        panel.show().unwrap();

        let png = image::open(&path).expect("should be a png").into_rgb8();
        assert_eq!((png.width(), png.height()), (432, 216));
    }
}
