use palette::Srgba;

pub struct PolylineStyle {
    pub stroke_color: Srgba<f32>,
    pub stroke_weight: f32,
}

impl PolylineStyle {
    /// The full route, drawn underneath everything else.
    pub fn route() -> Self {
        Self {
            stroke_color: Srgba::new(0.0, 136.0 / 255.0, 1.0, 0.6),
            stroke_weight: 6.0,
        }
    }

    /// The part of the route already travelled.
    pub fn progress() -> Self {
        Self {
            stroke_color: Srgba::new(1.0, 165.0 / 255.0, 0.0, 1.0),
            stroke_weight: 3.0,
        }
    }

    /// `#rrggbb` form of the stroke color, ignoring alpha.
    pub fn hex_color(&self) -> String {
        let rgb = self.stroke_color.color.into_format::<u8>();
        format!("#{:02X}{:02X}{:02X}", rgb.red, rgb.green, rgb.blue)
    }

    pub fn opacity(&self) -> f32 {
        self.stroke_color.alpha
    }
}

/// Bitmap used for the moving vehicle.
#[derive(Clone, Debug, PartialEq)]
pub struct IconStyle {
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// Pixel offset of the icon's pivot, from its top-left corner.
    pub anchor: (u32, u32),
    pub scale: f32,
}

impl IconStyle {
    pub fn vehicle() -> Self {
        Self {
            url: "https://images.vexels.com/media/users/3/154573/isolated/preview/bd08e000a449288c914d851cb9dae110-hatchback-car-top-view-silhouette-by-vexels.png".to_owned(),
            width: 40,
            height: 40,
            anchor: (20, 20),
            scale: 0.7,
        }
    }
}
